use crate::command::{ClusterAnalysis, DatasetEvaluation};
use std::collections::BTreeMap;
use std::path::Path;

pub fn render_evaluation_report(dataset: &Path, eval: &DatasetEvaluation) -> String {
    let mut md = String::new();
    md.push_str("# Dataset quality report\n\n");
    md.push_str(&format!("- Dataset: `{}`\n", dataset.display()));
    md.push_str(&format!("- Pairs: `{}`\n", eval.total_pairs));
    md.push_str(&format!(
        "- Sources: `{}`, intents: `{}`, clusters: `{}`\n\n",
        eval.sources.len(),
        eval.intents.len(),
        eval.clusters.len()
    ));

    md.push_str("## Lengths (whitespace tokens)\n\n");
    md.push_str("| field | min | max | avg |\n");
    md.push_str("|---|---:|---:|---:|\n");
    for (field, stats) in [("input", &eval.input_length), ("output", &eval.output_length)] {
        md.push_str(&format!(
            "| `{field}` | `{}` | `{}` | `{:.1}` |\n",
            stats.min, stats.max, stats.avg
        ));
    }
    md.push('\n');

    push_distribution(&mut md, "Intents", &eval.intents, eval.total_pairs);
    push_distribution(&mut md, "Sources", &eval.sources, eval.total_pairs);

    let metrics = &eval.quality_metrics;
    md.push_str("## Quality\n\n");
    md.push_str("| metric | score |\n");
    md.push_str("|---|---:|\n");
    for (name, score) in [
        ("diversity", metrics.diversity_score),
        ("balance", metrics.balance_score),
        ("coverage", metrics.coverage_score),
        ("cluster_efficiency", metrics.cluster_efficiency),
    ] {
        md.push_str(&format!("| {name} | `{score:.3}` |\n"));
    }
    md.push_str(&format!(
        "\n**Overall:** `{:.3}` ({})\n",
        eval.overall_score,
        eval.verdict.as_str()
    ));
    md
}

pub fn render_analysis_report(dataset: &Path, analysis: &ClusterAnalysis) -> String {
    let mut md = String::new();
    md.push_str("# Cluster analysis\n\n");
    md.push_str(&format!("- Dataset: `{}`\n", dataset.display()));
    md.push_str(&format!("- Clusters: `{}`\n", analysis.clusters.len()));
    md.push_str(&format!(
        "- Labels: `{}`\n",
        if analysis.reclustered {
            "recomputed"
        } else {
            "from dataset"
        }
    ));
    md.push_str(&format!(
        "- Shared source pairs: `{}`\n\n",
        analysis.total_overlaps
    ));

    md.push_str("## Clusters\n\n");
    md.push_str("| cluster | size | sources | top source | top intent | example |\n");
    md.push_str("|---:|---:|---:|---|---|---|\n");
    for profile in &analysis.clusters {
        md.push_str(&format!(
            "| `{}` | `{}` | `{}` | `{}` | `{}` | {} |\n",
            profile.cluster,
            profile.size,
            profile.sources.len(),
            profile.top_source.as_deref().unwrap_or("n/a"),
            profile.top_intent.as_deref().unwrap_or("n/a"),
            escape_cell(&truncate_one_line(
                profile.example.as_deref().unwrap_or_default(),
                80
            )),
        ));
    }
    md.push('\n');

    if !analysis.similarity.is_empty() {
        let sources: Vec<&String> = analysis.similarity.keys().collect();
        md.push_str("## Source similarity\n\n");
        md.push_str("| source |");
        for source in &sources {
            md.push_str(&format!(" `{}` |", escape_cell(source)));
        }
        md.push_str("\n|---|");
        md.push_str(&"---:|".repeat(sources.len()));
        md.push('\n');
        for (source, row) in &analysis.similarity {
            md.push_str(&format!("| `{}` |", escape_cell(source)));
            for other in &sources {
                let value = row.get(*other).copied().unwrap_or_default();
                md.push_str(&format!(" `{value:.3}` |"));
            }
            md.push('\n');
        }
        md.push('\n');
    }
    md
}

fn push_distribution(md: &mut String, title: &str, counts: &BTreeMap<String, usize>, total: usize) {
    let mut rows: Vec<_> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    md.push_str(&format!("## {title}\n\n"));
    md.push_str("| name | count | share |\n");
    md.push_str("|---|---:|---:|\n");
    for (name, count) in rows {
        let share = if total == 0 {
            0.0
        } else {
            *count as f64 * 100.0 / total as f64
        };
        md.push_str(&format!(
            "| `{}` | `{count}` | `{share:.1}%` |\n",
            escape_cell(name)
        ));
    }
    md.push('\n');
}

fn truncate_one_line(text: &str, max_chars: usize) -> String {
    let mut s = text.replace(['\n', '\r', '\t'], " ");
    s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if s.chars().count() <= max_chars {
        return s;
    }
    let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{truncated}…")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
