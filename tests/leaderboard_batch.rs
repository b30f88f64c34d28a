// tests/leaderboard_batch.rs
//
// Batch output contract: JSON shape, failure reporting, demo inputs.

use std::{fs, path::PathBuf};

use candidate_scoring::{
    CandidateInput, JobInput, Leaderboard, LeaderboardAggregator, ScoringConfig, ScoringPipeline,
    ShortlistMode, ShortlistStatus, SkillScore, SkillWeight,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn load_demo() -> (JobInput, Vec<CandidateInput>) {
    let job = serde_json::from_str(&fs::read_to_string(demo("job.json")).unwrap()).unwrap();
    let cands = serde_json::from_str(&fs::read_to_string(demo("candidates.json")).unwrap()).unwrap();
    (job, cands)
}

#[test]
fn leaderboard_json_carries_every_contract_field() {
    let (job, cands) = load_demo();
    let lb = LeaderboardAggregator::default()
        .build(&job, &cands)
        .stamped(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());

    let v = serde_json::to_value(&lb).unwrap();
    for key in [
        "job_id",
        "job_title",
        "total_applicants",
        "entries",
        "round_1_count",
        "round_2_count",
        "rejected_count",
        "statistics",
        "failures",
        "generated_at",
    ] {
        assert!(v.get(key).is_some(), "missing `{key}`");
    }
    assert_eq!(v["generated_at"], json!("2026-03-01T12:00:00Z"));

    let entry = &v["entries"][0];
    for key in [
        "candidate_id",
        "candidate_name",
        "weighted_score",
        "integrity_score",
        "final_score",
        "rank",
        "shortlist_status",
        "skill_breakdown",
        "has_consistency_issues",
    ] {
        assert!(entry.get(key).is_some(), "entry missing `{key}`");
    }

    let stats = &v["statistics"];
    assert!(stats["round_2"].get("candidates").is_some());
    assert!(stats["rejected"].get("candidates").is_none());
    assert!(stats["advancement_rate"].get("to_round_1").is_some());
}

#[test]
fn demo_cohort_ranks_and_reports_the_bad_row() {
    let (job, cands) = load_demo();
    let lb = LeaderboardAggregator::default().build(&job, &cands);

    assert_eq!(lb.total_applicants, 4);
    assert_eq!(lb.entries.len(), 3);
    assert_eq!(lb.failures.len(), 1);
    assert_eq!(lb.failures[0].index, 3);
    assert_eq!(lb.failures[0].candidate_id, "");

    assert_eq!(lb.entries[0].candidate_id, "cand-001");
    assert_eq!(lb.entries[0].shortlist_status, ShortlistStatus::Round2);
    assert!(!lb.entries[0].has_consistency_issues);

    // TypeScript claimed expert, scored 40
    let grace = lb.entries.iter().find(|e| e.candidate_id == "cand-002").unwrap();
    assert!(grace.has_consistency_issues);
    assert!(grace.integrity_score < 100.0);
}

#[test]
fn configured_alias_joins_nodejs_spelling() {
    let (job, cands) = load_demo();
    let cfg = ScoringConfig::from_toml_str(
        r#"
        [skills.aliases]
        "nodejs" = "node.js"
        "#,
    )
    .unwrap();

    let plain = ScoringPipeline::default().score(&job, &cands[1]).unwrap();
    let aliased = ScoringPipeline::new(cfg).score(&job, &cands[1]).unwrap();

    assert!(plain
        .processing_errors
        .iter()
        .any(|n| n.contains("closest assessed skill: 'NodeJS'")));
    assert!(aliased.weighted_score > plain.weighted_score);
    assert!(!aliased.processing_errors.iter().any(|n| n.contains("Node.js")));
}

#[test]
fn round_trips_through_json() {
    let job = JobInput::new("j", "J").with_weight(SkillWeight::new("Rust", 1.0));
    let cands = vec![
        CandidateInput::new("a", "A").with_score(SkillScore::new("Rust", 91.0)),
        CandidateInput::new("b", "B").with_score(SkillScore::new("Rust", 71.0)),
    ];
    let lb = LeaderboardAggregator::new(ScoringPipeline::default(), ShortlistMode::Absolute)
        .build(&job, &cands);

    let text = serde_json::to_string(&lb).unwrap();
    let back: Leaderboard = serde_json::from_str(&text).unwrap();
    assert_eq!(back, lb);

    let v: Value = serde_json::from_str(&text).unwrap();
    assert!(v.get("generated_at").is_none());
    assert_eq!(v["entries"][1]["shortlist_status"], json!("round_1"));
}

#[test]
fn raw_json_cohort_matches_typed_build_and_isolates_bad_rows() {
    let (job, cands) = load_demo();
    let raw: Vec<Value> =
        serde_json::from_str(&fs::read_to_string(demo("candidates.json")).unwrap()).unwrap();
    let typed = LeaderboardAggregator::default().build(&job, &cands);
    assert_eq!(LeaderboardAggregator::default().build_from_json(&job, &raw), typed);

    // a negative counter is just data; a wrong-typed field fails that row only
    let mut raw = raw;
    raw[0]["skill_scores"][0]["questions_attempted"] = json!(-5);
    raw[1]["skill_scores"] = json!({"not": "a list"});
    let lb = LeaderboardAggregator::default().build_from_json(&job, &raw);
    assert_eq!(lb.total_applicants, 4);
    assert_eq!(lb.entries.len(), 2);
    assert_eq!(lb.entries[0].candidate_id, "cand-001");
    let failed: Vec<_> = lb.failures.iter().map(|f| (f.index, f.candidate_id.as_str())).collect();
    assert_eq!(failed, vec![(1, "cand-002"), (3, "")]);
}

#[test]
fn queries_work_on_a_reloaded_leaderboard() {
    let (job, cands) = load_demo();
    let lb = LeaderboardAggregator::default().build(&job, &cands);
    let back: Leaderboard = serde_json::from_str(&serde_json::to_string(&lb).unwrap()).unwrap();

    let page = back.page(None, 0, Some(2));
    assert_eq!(page.total_filtered, 3);
    assert_eq!(page.entries.len(), 2);
    assert!(page.pagination.has_more);

    let r2 = back.shortlist(ShortlistStatus::Round2);
    // rate is over all submitted rows, the failed one included
    assert_eq!(r2.total_applicants, 4);
    assert_eq!(r2.shortlist_rate, (r2.shortlisted_count as f64 / 4.0 * 1000.0).round() / 10.0);

    assert_eq!(back.candidate("cand-002").map(|e| e.has_consistency_issues), Some(true));

    let report = serde_json::to_value(back.report().unwrap()).unwrap();
    assert_eq!(report["total_applicants"], json!(3));
    assert!(report["score_distribution"]["final_score"].get("median").is_some());
    assert!(report["score_distribution"]["final_score"].get("min").is_some());
    assert!(report["score_distribution"]["weighted_score"].get("median").is_none());
}
