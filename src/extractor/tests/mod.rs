use std::fs;

use crate::extractor::{Stage, extract_content, extract_with_stage};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{}", name))
        .expect("Failed to read test fixture")
}

#[test]
fn test_extract_article_body_without_noise() {
    let html = fixture("article.html");
    let (stage, text) = extract_with_stage(&html).unwrap();

    assert_eq!(stage, Stage::Content);
    assert!(text.starts_with("Primul paragraf"));
    assert!(text.contains("Al doilea paragraf"));
    assert!(!text.contains("Publicat azi"));
    assert!(!text.contains("tracking"));
    assert!(!text.contains("Citește și"));
    assert!(!text.contains("Drepturi rezervate"));
    assert!(!text.contains("Acasă"));
}

#[test]
fn test_first_matching_selector_wins_over_longer_text() {
    let html = format!(
        r#"<html><body><article><p>Scurt.</p></article><div class="content"><p>{}</p></div></body></html>"#,
        "Text mult mai lung în containerul generic. ".repeat(20)
    );
    assert_eq!(extract_content(&html), "Scurt.");
}

#[test]
fn test_blank_match_falls_through_to_next_selector() {
    let html = r#"<html><body>
        <article><script>var x = 1;</script><nav>meniu</nav></article>
        <div class="article-content"><p>Conținutul real al articolului.</p></div>
    </body></html>"#;
    assert_eq!(extract_content(html), "Conținutul real al articolului.");
}

#[test]
fn test_multiple_matches_are_concatenated() {
    let html = r#"<html><body><article>Prima parte.</article><article> A doua parte.</article></body></html>"#;
    assert_eq!(extract_content(html), "Prima parte. A doua parte.");
}

#[test]
fn test_title_fallback() {
    let html = r#"<html><head><title>  Doar titlul paginii  </title></head><body></body></html>"#;
    let (stage, text) = extract_with_stage(html).unwrap();
    assert_eq!(stage, Stage::Title);
    assert_eq!(text, "Doar titlul paginii");
}

#[test]
fn test_title_from_open_graph_meta() {
    let html = r#"<html><head><meta property="og:title" content="Titlu Open Graph"></head><body><p>nimic</p></body></html>"#;
    assert_eq!(extract_content(html), "Titlu Open Graph");
}

#[test]
fn test_title_inside_header() {
    let html = r#"<html><body><header class="entry-header"><h1>Titlu în antet</h1></header></body></html>"#;
    assert_eq!(extract_content(html), "Titlu în antet");
}

#[test]
fn test_description_fallback() {
    let html = fixture("description_only.html");
    let (stage, text) = extract_with_stage(&html).unwrap();
    assert_eq!(stage, Stage::Description);
    assert_eq!(
        text,
        "Descriere din Open Graph pentru pagina fără conținut vizibil."
    );
}

#[test]
fn test_total_failure_returns_empty_string() {
    assert_eq!(extract_content("<html><body></body></html>"), "");
    assert_eq!(extract_content(""), "");
    assert!(extract_with_stage("<html><body></body></html>").is_none());
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><title>Stricat</title><body><main><p>Etichete neînchise<div>Mai mult";
    let text = extract_content(html);
    assert!(text.contains("Etichete neînchise"));
    assert!(text.contains("Mai mult"));
}

#[test]
fn test_deterministic() {
    let html = fixture("article.html");
    assert_eq!(extract_content(&html), extract_content(&html));
}

#[test]
fn test_deeply_nested_markup() {
    let depth = 16_000;
    let html = format!(
        "<html><body><article>{}Adânc<script>x()</script>{}</article></body></html>",
        "<div>".repeat(depth),
        "</div>".repeat(depth)
    );
    assert_eq!(extract_content(&html), "Adânc");
}

#[test]
fn test_noise_skipped_at_any_depth_keeps_document_order() {
    let html = r#"<html><body><article>
        <div>Unu <span>doi <nav>meniu</nav></span> trei</div>
        <div><div><aside>reclamă</aside>patru</div></div>
    </article></body></html>"#;
    let text = extract_content(html);
    let words: Vec<&str> = text.split_whitespace().collect();
    assert_eq!(words, ["Unu", "doi", "trei", "patru"]);
}
