//! Summary statistics over the segmented table

use crate::data::{Metric, N_FEATURES};
use crate::table::SegmentedRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Size and per-metric means of one cluster
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterInsight {
    pub cluster: usize,
    pub size: usize,
    pub avg_forum_posts: f64,
    pub avg_discord_messages: f64,
    pub avg_webinar_attendance: f64,
    pub avg_office_hours: f64,
    pub avg_doc_views: f64,
    pub avg_templates: f64,
    pub avg_account_age: f64,
}

impl ClusterInsight {
    /// Mean of one metric within the cluster
    pub fn average(&self, metric: Metric) -> f64 {
        match metric {
            Metric::ForumPosts => self.avg_forum_posts,
            Metric::DiscordMessages => self.avg_discord_messages,
            Metric::WebinarAttendance => self.avg_webinar_attendance,
            Metric::OfficeHoursAttendance => self.avg_office_hours,
            Metric::DocumentationViews => self.avg_doc_views,
            Metric::TemplatesUsed => self.avg_templates,
            Metric::AccountAgeDays => self.avg_account_age,
        }
    }
}

/// Per-cluster size and metric means, in ascending cluster order
///
/// Only clusters that have at least one row appear. Empty input gives an
/// empty result.
pub fn analyze_clusters(rows: &[SegmentedRecord]) -> Vec<ClusterInsight> {
    let mut sums: BTreeMap<usize, (usize, [f64; N_FEATURES])> = BTreeMap::new();
    for row in rows {
        let entry = sums.entry(row.cluster).or_insert((0, [0.0; N_FEATURES]));
        entry.0 += 1;
        for (acc, value) in entry.1.iter_mut().zip(row.record.features()) {
            *acc += value;
        }
    }

    sums.into_iter()
        .map(|(cluster, (size, totals))| {
            let avg = |m: Metric| totals[m.index()] / size as f64;
            ClusterInsight {
                cluster,
                size,
                avg_forum_posts: avg(Metric::ForumPosts),
                avg_discord_messages: avg(Metric::DiscordMessages),
                avg_webinar_attendance: avg(Metric::WebinarAttendance),
                avg_office_hours: avg(Metric::OfficeHoursAttendance),
                avg_doc_views: avg(Metric::DocumentationViews),
                avg_templates: avg(Metric::TemplatesUsed),
                avg_account_age: avg(Metric::AccountAgeDays),
            }
        })
        .collect()
}

/// Keep only rows whose segment is in `selected`
pub fn filter_segments<'a, S: AsRef<str>>(
    rows: &'a [SegmentedRecord],
    selected: &[S],
) -> Vec<&'a SegmentedRecord> {
    rows.iter()
        .filter(|r| selected.iter().any(|s| s.as_ref() == r.segment))
        .collect()
}

/// Distinct segment names, sorted
pub fn segment_names<'a>(rows: &[&'a SegmentedRecord]) -> Vec<&'a str> {
    rows.iter()
        .map(|r| r.segment.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Total engagement on one channel for one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTotal {
    pub segment: String,
    pub channel: Metric,
    pub engagement: u64,
}

/// Sum each of the six channels per segment, ordered by segment then channel
pub fn channel_totals(rows: &[&SegmentedRecord]) -> Vec<ChannelTotal> {
    let mut totals: BTreeMap<(&str, Metric), u64> = BTreeMap::new();
    for row in rows {
        for channel in Metric::CHANNELS {
            *totals.entry((row.segment.as_str(), channel)).or_insert(0) +=
                u64::from(row.record.metric(channel));
        }
    }

    totals
        .into_iter()
        .map(|((segment, channel), engagement)| ChannelTotal {
            segment: segment.to_string(),
            channel,
            engagement,
        })
        .collect()
}

/// Segments ranked by the summed value of `metric`, highest first, at most `limit`
pub fn top_segments_by(rows: &[&SegmentedRecord], metric: Metric, limit: usize) -> Vec<(String, u64)> {
    let mut sums: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        *sums.entry(row.segment.as_str()).or_insert(0) += u64::from(row.record.metric(metric));
    }

    let mut ranked: Vec<(String, u64)> = sums
        .into_iter()
        .map(|(segment, total)| (segment.to_string(), total))
        .collect();
    // stable sort keeps alphabetical order among equal totals
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Segment with the highest summed `metric`
pub fn most_active_segment(rows: &[&SegmentedRecord], metric: Metric) -> Option<String> {
    top_segments_by(rows, metric, 1).into_iter().next().map(|(segment, _)| segment)
}

/// Channel with the highest total engagement across all rows
///
/// Equal totals resolve to the alphabetically first channel name.
pub fn top_channel(rows: &[&SegmentedRecord]) -> Option<Metric> {
    if rows.is_empty() {
        return None;
    }

    let mut channels = Metric::CHANNELS;
    channels.sort_by_key(|m| m.column_name());

    let mut best: Option<(Metric, u64)> = None;
    for channel in channels {
        let total: u64 = rows.iter().map(|r| u64::from(r.record.metric(channel))).sum();
        if best.map_or(true, |(_, t)| total > t) {
            best = Some((channel, total));
        }
    }
    best.map(|(channel, _)| channel)
}

/// Mean of `metric` over the rows
pub fn metric_mean(rows: &[&SegmentedRecord], metric: Metric) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    let total: f64 = rows.iter().map(|r| f64::from(r.record.metric(metric))).sum();
    Some(total / rows.len() as f64)
}

/// Largest value of `metric` over the rows
pub fn metric_max(rows: &[&SegmentedRecord], metric: Metric) -> Option<u32> {
    rows.iter().map(|r| r.record.metric(metric)).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EngagementRecord;

    fn row(user_id: u32, cluster: usize, segment: &str, base: u32) -> SegmentedRecord {
        SegmentedRecord {
            record: EngagementRecord {
                user_id,
                forum_posts: base,
                discord_messages: base * 10,
                webinar_attendance: 1,
                office_hours_attendance: 0,
                documentation_views: base * 2,
                templates_used: 4,
                account_age_days: 30 * user_id,
            },
            cluster,
            segment: segment.to_string(),
        }
    }

    fn create_test_rows() -> Vec<SegmentedRecord> {
        vec![
            row(1, 1, "Agencies", 2),
            row(2, 0, "Indies", 10),
            row(3, 1, "Agencies", 4),
            row(4, 0, "Indies", 20),
            row(5, 3, "Startups", 1),
        ]
    }

    #[test]
    fn test_analyze_clusters() {
        let insights = analyze_clusters(&create_test_rows());

        assert_eq!(insights.iter().map(|i| i.cluster).collect::<Vec<_>>(), vec![0, 1, 3]);
        assert_eq!(insights.iter().map(|i| i.size).sum::<usize>(), 5);

        let first = &insights[0];
        assert_eq!(first.size, 2);
        assert_eq!(first.avg_forum_posts, 15.0);
        assert_eq!(first.avg_discord_messages, 150.0);
        assert_eq!(first.avg_account_age, 90.0);
        assert_eq!(first.average(Metric::DocumentationViews), 30.0);
    }

    #[test]
    fn test_analyze_empty() {
        assert!(analyze_clusters(&[]).is_empty());
    }

    #[test]
    fn test_filter_and_segment_names() {
        let rows = create_test_rows();
        let filtered = filter_segments(&rows, &["Indies", "Startups"][..]);
        assert_eq!(filtered.len(), 3);
        assert_eq!(segment_names(&filtered), vec!["Indies", "Startups"]);

        let none: Vec<&str> = Vec::new();
        assert!(filter_segments(&rows, &none).is_empty());
    }

    #[test]
    fn test_channel_totals() {
        let rows = create_test_rows();
        let all: Vec<&SegmentedRecord> = rows.iter().collect();
        let totals = channel_totals(&all);

        assert_eq!(totals.len(), 3 * Metric::CHANNELS.len());
        let indies_discord = totals
            .iter()
            .find(|t| t.segment == "Indies" && t.channel == Metric::DiscordMessages)
            .unwrap();
        assert_eq!(indies_discord.engagement, 300);
        assert!(totals.iter().all(|t| t.channel != Metric::AccountAgeDays));
    }

    #[test]
    fn test_key_insights() {
        let rows = create_test_rows();
        let all: Vec<&SegmentedRecord> = rows.iter().collect();

        let top = top_segments_by(&all, Metric::DiscordMessages, 2);
        assert_eq!(top, vec![("Indies".to_string(), 300), ("Agencies".to_string(), 60)]);
        assert_eq!(most_active_segment(&all, Metric::DiscordMessages).as_deref(), Some("Indies"));
        assert_eq!(top_channel(&all), Some(Metric::DiscordMessages));

        assert_eq!(metric_mean(&all, Metric::TemplatesUsed), Some(4.0));
        assert_eq!(metric_max(&all, Metric::ForumPosts), Some(20));
        assert_eq!(top_channel(&[]), None);
        assert_eq!(metric_mean(&[], Metric::ForumPosts), None);
    }

    #[test]
    fn test_top_channel_tie_goes_to_first_name() {
        let mut tied = row(1, 0, "Indies", 0);
        tied.record.forum_posts = 50;
        tied.record.documentation_views = 50;
        tied.record.discord_messages = 10;

        let rows = vec![&tied];
        assert_eq!(top_channel(&rows), Some(Metric::DocumentationViews));
    }
}
