//! Built-in question catalogue for Dutch procurement contracts.

use super::{MatcherSpec, QuestionSpec};
use crate::matchers::{TokenConstraint, TokenPattern};

fn pattern(patterns: &[&str]) -> MatcherSpec {
    MatcherSpec::Pattern {
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
    }
}

fn lemma(v: &str) -> TokenConstraint {
    TokenConstraint::Lemma(v.to_string())
}

fn lower(v: &str) -> TokenConstraint {
    TokenConstraint::Lower(v.to_string())
}

pub(super) fn builtin_questions() -> Vec<QuestionSpec> {
    vec![
        QuestionSpec::new("q8", pattern(&[r"(?s)tussen *(.*?dossiernummer *\d*)"]))
            .with_description("Contracting parties, from 'tussen' up to the dossier number"),
        QuestionSpec::new(
            "q13",
            pattern(&[
                r"(?s)wie is de hoofddienstverlener\?(.*?)land",
                r"(?s)dossiernummer *\d* *en(.*?dossiernummer *\d*)",
            ]),
        )
        .with_description("Main service provider"),
        QuestionSpec::new("q17", pattern(&[r".{200}onbepaalde\s{1,10}tijd.{200}"]))
            .with_description("Contract entered for an indefinite period"),
        QuestionSpec::new("q20", pattern(&[r".{40}exit.{1,5}plan.{40}"]))
            .with_description("Exit plan"),
        QuestionSpec::new("q23", pattern(&[r".{100}opzegtermijn.{100}"]))
            .with_description("Notice period, with 100 characters of context"),
        QuestionSpec::new(
            "q27",
            MatcherSpec::Structural {
                patterns: vec![
                    TokenPattern(vec![lemma("betaal"), lemma("termijn")]),
                    TokenPattern(vec![lemma("betaal"), lemma("afspraak")]),
                    TokenPattern(vec![lower("betaaltermijn")]),
                    TokenPattern(vec![lemma("facturering")]),
                ],
                filter_overlaps: false,
            },
        )
        .with_description("Payment terms"),
        QuestionSpec::new(
            "q28",
            MatcherSpec::Structural {
                patterns: vec![
                    TokenPattern(vec![lemma("factuur"), lemma("afspraak")]),
                    TokenPattern(vec![lemma("factuur"), lemma("voorwaarde")]),
                    TokenPattern(vec![lower("factureringsvoorwaarden")]),
                    TokenPattern(vec![lower("facturering")]),
                    TokenPattern(vec![lower("betaling")]),
                ],
                filter_overlaps: false,
            },
        )
        .with_description("Invoicing conditions"),
        QuestionSpec::new(
            "q31",
            pattern(&[
                r".(?:wijzig.{1,5}|aanvull.{1,5}).{1,100}algemene.{1,10}inkoopvoorwaarde |algemene.{1,10}inkoopvoorwaarde.{1,100}(?:wijzig.{1,5}|aanvull.{1,5})",
                r"(versie\s{1,5}\w{4,10}\s{1,5}\d{4}).{1,100}?(algemene.*?inkoopvoorwaarden)",
            ]),
        )
        .with_description("Changes to, and version of, the general purchasing conditions"),
        QuestionSpec::new(
            "q41",
            MatcherSpec::Similarity {
                references: vec!["test1".into(), "test2".into(), "test3".into()],
                threshold: 0.51,
            },
        )
        .with_description("Similarity to reference documents (placeholder corpus)"),
        QuestionSpec::new(
            "q42",
            MatcherSpec::Frequency {
                words: vec!["risk".into(), "risico".into()],
                threshold: 0.001,
            },
        )
        .with_description("Risk vocabulary density"),
        QuestionSpec::new("q51", pattern(&[r".{50}bivc.{1,20}?\d.*?\d.*?\d.*?\d?.{50}"]))
            .with_description("BIVC code"),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::QuestionRegistry;
    use crate::document::Document;

    #[test]
    fn test_payment_terms_question() {
        let pipeline = QuestionRegistry::builtin().unwrap().pipeline(&["q27", "q28"]).unwrap();
        let doc = Document::from_pages("d1", &["Intro", "De betaaltermijn is dertig dagen na facturering."]);

        let ctx = pipeline.run(&doc).unwrap();
        let q27 = ctx.result("q27").unwrap();
        assert_eq!(q27.page_numbers(), &[Some(1)]);
        assert!(ctx.result("q28").unwrap().matched());
    }

    #[test]
    fn test_purchasing_conditions_version() {
        let pipeline = QuestionRegistry::builtin().unwrap().pipeline(&["q31"]).unwrap();
        let doc = Document::from_pages(
            "d1",
            &["Van toepassing is versie januari 2019 van de algemene inkoopvoorwaarden."],
        );
        assert!(pipeline.run(&doc).unwrap().result("q31").unwrap().matched());
    }

    #[test]
    fn test_placeholder_corpus_does_not_match_contract_text() {
        let pipeline = QuestionRegistry::builtin().unwrap().pipeline(&["q41"]).unwrap();
        let doc = Document::from_pages("d1", &["Overeenkomst voor de levering van diensten"]);
        let ctx = pipeline.run(&doc).unwrap();
        assert!(!ctx.result("q41").unwrap().matched());
    }
}
