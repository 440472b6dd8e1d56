//! Order independence, exactly-once content and fingerprint agreement.

mod common;

use common::*;
use proptest::prelude::*;
use sdt_core::model::write_element;
use sdt_core::util::TextNormalizer;
use sdt_core::wml::fingerprint;
use sdt_core::wml::identity::{classify, node_fingerprint};
use sdt_core::xml::parser::parse;
use sdt_core::{ContentElement, InjectionPair, Paragraph, PartTarget, Run, Table, TableCell, Title};

fn fixture() -> (Vec<ContentElement>, Vec<InjectionPair>) {
    let table = Table::from_text([["alpha", "beta"], ["gamma", "delta"]]);
    let elements = vec![
        Title::new("Report", 0).into(),
        Paragraph::new("Intro").into(),
        table.clone().into(),
        Paragraph::new("Outro").into(),
    ];
    let pairs = vec![
        InjectionPair::new(Title::new("Report", 0), tagged(10_000_001, "title")),
        InjectionPair::new(Paragraph::new("Intro"), tagged(10_000_002, "intro")),
        InjectionPair::new(table, tagged(10_000_003, "table")),
        InjectionPair::new(TableCell::new("beta"), tagged(10_000_004, "beta").with_inline_level(true)),
        InjectionPair::new(
            Paragraph::new("gamma"),
            tagged(10_000_005, "gamma").with_inline_level(true),
        ),
        InjectionPair::new(Run::new("Outro"), tagged(10_000_006, "outro").with_run_level(true)),
    ];
    (elements, pairs)
}

fn inject(elements: &[ContentElement], batch: &[InjectionPair]) -> String {
    let mut doc = document(elements.to_vec());
    doc.inject_all(batch).unwrap();
    xml(&doc, PartTarget::Body)
}

proptest! {
    #[test]
    fn result_does_not_depend_on_batch_order(order in Just((0..6).collect::<Vec<usize>>()).prop_shuffle()) {
        let (elements, pairs) = fixture();
        let expected = inject(&elements, &pairs);

        let shuffled: Vec<InjectionPair> = order.iter().map(|&i| pairs[i].clone()).collect();
        let actual = inject(&elements, &shuffled);

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn every_paragraph_is_wrapped_exactly_once(texts in prop::collection::vec("[ab]{1,2}", 1..8)) {
        let elements: Vec<ContentElement> = texts.iter().map(|t| Paragraph::new(t).into()).collect();
        let batch: Vec<InjectionPair> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| InjectionPair::new(Paragraph::new(t), config(10_000_000 + i as u32)))
            .collect();

        let mut doc = document(elements);
        let report = doc.inject_all(&batch).unwrap();
        let body = xml(&doc, PartTarget::Body);

        prop_assert_eq!(report.parts[0].fallbacks, 0);
        prop_assert_eq!(count(&body, "p"), texts.len());
        prop_assert_eq!(count(&body, "sdt"), texts.len());
        prop_assert!(all_paragraphs_wrapped(&body));
    }

    #[test]
    fn fingerprints_are_deterministic_and_kind_sensitive(text in "\\PC{0,24}") {
        let normalizer = TextNormalizer::default();
        let paragraph = ContentElement::from(Paragraph::new(&text));

        prop_assert_eq!(
            fingerprint(&paragraph, &normalizer),
            fingerprint(&paragraph.clone(), &normalizer)
        );
        prop_assert_ne!(
            fingerprint(&paragraph, &normalizer),
            fingerprint(&Run::new(&text).into(), &normalizer)
        );
        prop_assert_ne!(
            fingerprint(&paragraph, &normalizer),
            fingerprint(&Title::new(&text, 1).into(), &normalizer)
        );
    }

    #[test]
    fn fingerprints_follow_visible_text(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        let normalizer = TextNormalizer::default();
        let fa = fingerprint(&Paragraph::new(&a).into(), &normalizer);
        let fb = fingerprint(&Paragraph::new(&b).into(), &normalizer);
        prop_assert_eq!(fa == fb, a == b);
    }

    #[test]
    fn serialized_paragraph_matches_its_model(text in "[a-zA-Z0-9 &<>'\"\u{e9}]{0,20}") {
        let normalizer = TextNormalizer::default();
        let element = ContentElement::from(Paragraph::new(&text));
        let xml = format!(r#"<w:body xmlns:w="{W_NS}">{}</w:body>"#, write_element(&element));
        let doc = parse(&xml).unwrap();
        let root = doc.root().unwrap();
        let p = doc.children(root).next().unwrap();

        let kind = classify(&doc, p).unwrap();
        prop_assert_eq!(
            node_fingerprint(&doc, p, kind, &normalizer),
            fingerprint(&element, &normalizer)
        );
    }
}
