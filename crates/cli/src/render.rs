//! Plain-text rendering of views.

use std::fmt::Write;

use chunkycloud_client::views::JobReport;
use chunkycloud_core::assets::{AssetMatcher, FilePicker};
use chunkycloud_core::metrics::{display_or_unavailable, format_count, format_elapsed, format_number};
use chunkycloud_core::resource_pack::{ResourcePack, DEFAULT_PACK_LABEL};
use chunkycloud_core::stats::AggregateStats;

const LABEL_WIDTH: usize = 16;

fn row(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {label:<LABEL_WIDTH$}{value}");
}

pub fn job(report: &JobReport) -> String {
    let job = &report.job;
    let metrics = &report.metrics;
    let mut out = String::new();

    let _ = writeln!(out, "Job {}", job.id);
    let progress = display_or_unavailable(metrics.progress_percent, |p| format!("{p}%"));
    row(
        &mut out,
        "Progress",
        format!(
            "{} / {} spp ({progress})",
            format_count(job.spp),
            format_count(job.target_spp)
        ),
    );
    row(&mut out, "Created", job.created.format("%Y-%m-%d %H:%M:%S UTC"));
    row(&mut out, "Finished", metrics.finish);
    row(
        &mut out,
        "Total time",
        display_or_unavailable(metrics.total_time, format_elapsed),
    );
    row(
        &mut out,
        "Samples/sec",
        display_or_unavailable(metrics.effective_sps, format_number),
    );
    row(
        &mut out,
        "Render time",
        display_or_unavailable(metrics.render_time, format_elapsed),
    );
    row(
        &mut out,
        "Avg samples/sec",
        display_or_unavailable(metrics.average_sps, format_number),
    );
    row(
        &mut out,
        "Preview",
        report.preview_url.as_deref().unwrap_or("not rendered yet"),
    );
    if let Some(dump_url) = &report.dump_url {
        row(&mut out, "Dump", dump_url);
    }
    out
}

pub fn stats(stats: &AggregateStats) -> String {
    let tasks = &stats.tasks;
    let mut out = String::new();

    out.push_str("Tasks\n");
    row(
        &mut out,
        "Prepare",
        format!("{} pending, {} running", tasks.prepare_pending, tasks.prepare_running),
    );
    row(
        &mut out,
        "Render",
        format!("{} pending, {} running", tasks.pending, tasks.running),
    );
    row(
        &mut out,
        "Merge",
        format!("{} pending, {} running", tasks.merge_pending, tasks.merge_running),
    );

    out.push_str("Today\n");
    row(&mut out, "Jobs created", format_count(stats.today.jobs_created));
    row(&mut out, "Jobs finished", format_count(stats.today.jobs_finished));
    row(&mut out, "Dumps merged", format_count(stats.today.dumps_merged));

    let _ = writeln!(
        out,
        "Render nodes ({} of {} threads working)",
        stats.working_render_threads(),
        stats.total_render_threads()
    );
    for node in &stats.render_nodes {
        row(
            &mut out,
            &node.name,
            format!("{} ({} threads)", node.status, node.thread_count),
        );
    }

    out.push_str("Prepare nodes\n");
    for node in &stats.prepare_nodes {
        row(&mut out, &node.name, &node.status);
    }
    out
}

pub fn resource_packs(packs: &[ResourcePack]) -> String {
    let mut out = String::new();
    row(&mut out, "(default)", DEFAULT_PACK_LABEL);
    for pack in packs {
        row(&mut out, &pack.name, &pack.display_name);
    }
    out
}

fn picker(picker: &FilePicker) -> String {
    match (&picker.selected, picker.enabled) {
        (Some(name), _) => name.clone(),
        (None, true) => "(none)".to_string(),
        (None, false) => "(not needed)".to_string(),
    }
}

/// Summary of what is about to be submitted.
pub fn bundle(matcher: &AssetMatcher) -> String {
    let inputs = matcher.inputs();
    let bundle = matcher.bundle();
    let mut out = String::new();

    out.push_str("Scene\n");
    row(&mut out, "Description", picker(&inputs.description));
    row(&mut out, "Octree", picker(&inputs.octree));
    row(&mut out, "Emitter grid", picker(&inputs.emitter_grid));
    row(&mut out, "Skymap", picker(&inputs.skymap));
    row(&mut out, "Target spp", bundle.target_spp);
    row(
        &mut out,
        "Resource pack",
        bundle.resource_pack.as_deref().unwrap_or(DEFAULT_PACK_LABEL),
    );
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use chunkycloud_client::{ClientConfig, RenderApi};
    use chunkycloud_core::assets::{DroppedEntry, SceneFile};
    use chunkycloud_core::job::JobState;
    use chunkycloud_core::stats::{NodeStatus, RenderNode};
    use chunkycloud_core::types::JobId;

    use super::*;

    fn report(cancelled: bool) -> JobReport {
        let api = RenderApi::new(&ClientConfig {
            api_url: "http://render.test".into(),
            ..ClientConfig::default()
        })
        .unwrap();
        let job = JobState {
            id: JobId::new("abc"),
            created: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            finished_at: None,
            cancelled,
            spp: 1500,
            target_spp: 3000,
            render_time_seconds: None,
            scene_description: None,
            picture_only: false,
        };
        let now = Utc.with_ymd_and_hms(2021, 1, 1, 1, 2, 3).unwrap();
        JobReport::new(&api, Arc::new(job), now)
    }

    #[test]
    fn running_job() {
        let text = job(&report(false));
        assert!(text.starts_with("Job abc\n"));
        assert!(text.contains("1,500 / 3,000 spp (50%)"));
        assert!(text.contains("01:02:03"));
        assert!(text.contains("http://render.test/jobs/abc/latest.png?1500"));
        assert!(text.contains("Dump"));
    }

    #[test]
    fn cancelled_job_has_no_timings() {
        let text = job(&report(true));
        assert!(text.contains("Cancelled"));
        assert!(!text.contains("01:02:03"));
    }

    #[test]
    fn stats_thread_totals() {
        let stats = AggregateStats {
            render_nodes: vec![
                RenderNode {
                    name: "node-a".into(),
                    status: NodeStatus::Working,
                    thread_count: 12,
                },
                RenderNode {
                    name: "node-b".into(),
                    status: NodeStatus::Idle,
                    thread_count: 4,
                },
            ],
            ..AggregateStats::default()
        };
        let text = super::stats(&stats);
        assert!(text.contains("Render nodes (12 of 16 threads working)"));
        assert!(text.contains("idle (4 threads)"));
    }

    #[test]
    fn default_pack_listed_first() {
        let packs = [ResourcePack {
            name: "faithful-1.16.4".into(),
            display_name: "Faithful 32x".into(),
        }];
        let text = resource_packs(&packs);
        let first = text.lines().next().unwrap();
        assert!(first.contains(DEFAULT_PACK_LABEL));
        assert!(text.contains("Faithful 32x"));
    }

    #[test]
    fn bundle_summary_marks_unused_pickers() {
        let mut matcher = AssetMatcher::new();
        let files = chunkycloud_core::assets::flatten_entries(vec![DroppedEntry::File(
            SceneFile::in_memory("castle.octree2", Vec::<u8>::new()),
        )]);
        matcher.match_drop(&files, None);

        let text = bundle(&matcher);
        assert!(text.contains("castle.octree2"));
        assert!(text.contains("(not needed)"));
        assert!(text.contains(DEFAULT_PACK_LABEL));
    }
}
