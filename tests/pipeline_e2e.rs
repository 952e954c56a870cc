// tests/pipeline_e2e.rs
//
// End-to-end: CSV on disk → AnalysisService → accessor views.

use std::io::Write;
use std::sync::Arc;

use narrative_risk_analyzer::ingest::types::RawRow;
use narrative_risk_analyzer::risk::RiskLabel;
use narrative_risk_analyzer::{AnalysisError, AnalysisService, AnalyzeRequest};

const CSV: &str = "title,text,date\n\
\"Shocking panic: urgent secret exposed\",\"Panic spreads as the secret plan is exposed\",2024-03-01\n\
\"Shocking panic: urgent secret exposed\",\"Panic spreads as the secret plan is exposed today\",2024-03-01\n\
\"City library extends opening hours\",\"Residents welcomed the longer weekend hours at the library.\",2024-03-02\n\
\"City library extends opening hours\",\"Residents welcomed the longer weekend hours at the library.\",2024-03-03\n";

fn dataset() -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    f.write_all(CSV.as_bytes()).unwrap();
    f
}

#[test]
fn accessors_require_a_prior_run() {
    let svc = AnalysisService::default();
    let err = svc.last_result().unwrap_err();
    assert!(matches!(err, AnalysisError::NoAnalysis));
    assert_eq!(err.to_string(), "No analysis found. Run /analyze first.");
}

#[test]
fn csv_run_scores_and_summarizes() {
    let f = dataset();
    let svc = AnalysisService::default();
    let res = svc.analyze(&AnalyzeRequest::for_path(f.path())).expect("analyze");

    // the exact duplicate library row is gone
    assert_eq!(res.meta.total_records, 3);
    assert!(res.meta.has_temporal_data);

    let alarm = &res.records[0];
    let twin = &res.records[1];
    let calm = &res.records[2];

    assert!(alarm.signals.narrative.narrative_repetition_flag);
    assert!(twin.signals.narrative.narrative_repetition_flag);
    assert!(!calm.signals.narrative.narrative_repetition_flag);
    assert!(alarm.risk.risk_score > calm.risk.risk_score);
    assert_eq!(alarm.risk.keyword_component, 100.0);
    assert_eq!(calm.risk.keyword_component, 0.0);
    assert_eq!(
        alarm.signals.suspicious_keywords,
        vec!["shocking", "urgent", "secret", "exposed", "panic"]
    );
    assert!(alarm.risk.explanation.starts_with("Risk driven by "));

    for r in &res.records {
        let mean = (r.risk.sentiment_component
            + r.risk.keyword_component
            + r.risk.emotion_component
            + r.risk.narrative_component)
            / 4.0;
        assert_eq!(r.risk.risk_score, (mean * 100.0).round() / 100.0);
    }

    let keywords: Vec<(String, u64)> = res
        .keyword_trends()
        .into_iter()
        .map(|k| (k.keyword, k.frequency))
        .collect();
    assert_eq!(keywords[0], ("secret".to_string(), 4));
    assert_eq!(keywords[1], ("exposed".to_string(), 4));
    assert_eq!(keywords[2], ("panic".to_string(), 4));
    assert_eq!(keywords[3], ("shocking".to_string(), 2));

    let days: Vec<String> = res
        .temporal_trends()
        .iter()
        .map(|b| b.date.to_string())
        .collect();
    assert_eq!(days, vec!["2024-03-01", "2024-03-02"]);
    assert_eq!(res.temporal_trends()[0].repeated_narratives, 2);

    let risk_total: usize = res.risk_summary().iter().map(|c| c.count).sum();
    assert_eq!(risk_total, 3);
    let names: Vec<&str> = res.status_summary().iter().map(|s| s.name).collect();
    assert!(names.iter().all(|n| ["Fake", "Suspicious", "Real"].contains(n)));
}

#[test]
fn record_json_uses_flat_columns() {
    let svc = AnalysisService::default();
    let res = svc
        .analyze_records(
            vec![
                RawRow::new("One", "first text here"),
                RawRow::new("Two", "second text there"),
            ],
            &AnalyzeRequest::default(),
        )
        .unwrap();
    let v = serde_json::to_value(&res.records[0]).unwrap();
    for key in [
        "title",
        "text",
        "analysis_text",
        "cleaned_text",
        "sentiment_compound",
        "sentiment_label",
        "keyword_suspicion_score",
        "emotional_intensity_score",
        "max_narrative_similarity",
        "narrative_repetition_flag",
        "risk_score",
        "risk_label",
        "suspicious_keywords",
        "explanation",
    ] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
    assert!(v.get("tokens").is_none());
    assert!(!res.meta.has_temporal_data);
}

#[test]
fn high_risk_view_only_holds_high_labels() {
    let f = dataset();
    let svc = AnalysisService::default();
    let res = svc.analyze(&AnalyzeRequest::for_path(f.path())).unwrap();
    let high = res.high_risk_records(20);
    assert_eq!(
        high.len(),
        res.records
            .iter()
            .filter(|r| r.risk.risk_label == RiskLabel::High)
            .count()
    );
}

#[test]
fn concurrent_runs_each_get_their_own_result() {
    let svc = Arc::new(AnalysisService::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let svc = Arc::clone(&svc);
            std::thread::spawn(move || {
                let rows: Vec<RawRow> = (0..=i)
                    .map(|j| RawRow::new(format!("title {j}"), format!("body number {j}")))
                    .collect();
                let res = svc.analyze_records(rows, &AnalyzeRequest::default()).unwrap();
                assert_eq!(res.meta.total_records, i + 1);
                res.meta.total_records
            })
        })
        .collect();
    let sizes: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let last = svc.last_result().unwrap();
    assert!(sizes.contains(&last.meta.total_records));
    assert_eq!(last.records.len(), last.meta.total_records);
}
