#![no_main]

use libfuzzer_sys::fuzz_target;

use adevar::extractor::extract_content;
use adevar::text::normalize;

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);

    // Neither stage may panic, and normalizing twice changes nothing.
    let content = extract_content(&html);
    let once = normalize(&content);
    let twice = normalize(once.as_str());
    assert_eq!(once, twice);
});
