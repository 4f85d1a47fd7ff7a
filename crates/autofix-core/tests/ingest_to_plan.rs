//! Ingest-to-plan pipeline tests over a realistic findings document.

use autofix_core::{parse_findings, plan, BatchManifest, Tier};

fn analyzer_document() -> String {
    let mut results = Vec::new();
    // Two files flagged by the same injection rule, enough to fill batches.
    for line in [4, 17, 29, 41, 58] {
        results.push(("py/sql-injection", "src/db/queries.py", line));
    }
    for line in [12, 33, 71] {
        results.push(("py/sql-injection", "src/db/admin.py", line));
    }
    // Scattered singletons that only share a directory.
    results.push(("py/unused-import", "src/util/text.py", 1));
    results.push(("py/shadowed-name", "src/util/num.py", 9));

    let results: Vec<serde_json::Value> = results
        .into_iter()
        .map(|(rule, file, line)| {
            serde_json::json!({
                "ruleId": rule,
                "level": "warning",
                "message": { "text": "flagged" },
                "locations": [{ "physicalLocation": {
                    "artifactLocation": { "uri": file },
                    "region": { "startLine": line }
                }}]
            })
        })
        .collect();
    serde_json::json!({ "version": "2.1.0", "runs": [{ "results": results }] }).to_string()
}

#[test]
fn test_ingest_then_plan_partitions_all_findings() {
    let findings = parse_findings(&analyzer_document()).expect("parse");
    assert_eq!(findings.len(), 10);

    let plan = plan(&findings, 4, None).expect("plan");
    assert_eq!(plan.total_findings(), 10);
    assert!(plan.unprocessed.is_empty());

    // queries.py fills a tier A group (5 findings -> batches of 4 + 1);
    // admin.py (3) joins the rule-level tier B pool, which falls short of
    // a full batch and lands in tier C with its directory.
    let tiers: Vec<Tier> = plan.batches.iter().map(|b| b.tier).collect();
    assert_eq!(tiers[0], Tier::A);
    assert!(tiers.contains(&Tier::C));
}

#[test]
fn test_manifest_reflects_plan() {
    let findings = parse_findings(&analyzer_document()).expect("parse");
    let plan = plan(&findings, 4, Some(2)).expect("plan");
    let manifest = BatchManifest::from_plan("org/app", &plan);

    assert_eq!(manifest.entries.len(), 2);
    let manifest_total: usize = manifest.entries.iter().map(|e| e.size).sum();
    assert_eq!(
        manifest_total + manifest.unprocessed_finding_ids.len(),
        10,
        "manifest accounts for every finding"
    );
}
