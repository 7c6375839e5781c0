//! Synthetic engagement data and feature matrix construction

use clap::ValueEnum;
use ndarray::Array2;
use rand::Rng;
use std::fmt;

/// Number of numeric features used for clustering
pub const N_FEATURES: usize = 7;

/// One numeric attribute of an engagement record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Metric {
    /// Posts written on the community forum
    #[value(name = "forum_posts")]
    ForumPosts,
    /// Messages sent on Discord
    #[value(name = "discord_messages")]
    DiscordMessages,
    /// Webinars attended
    #[value(name = "webinar_attendance")]
    WebinarAttendance,
    /// Office-hours sessions attended
    #[value(name = "office_hours_attendance")]
    OfficeHoursAttendance,
    /// Documentation page views
    #[value(name = "documentation_views")]
    DocumentationViews,
    /// Templates used
    #[value(name = "templates_used")]
    TemplatesUsed,
    /// Days since the account was created
    #[value(name = "account_age_days")]
    AccountAgeDays,
}

impl Metric {
    /// All seven features, in feature-matrix column order
    pub const ALL: [Metric; N_FEATURES] = [
        Metric::ForumPosts,
        Metric::DiscordMessages,
        Metric::WebinarAttendance,
        Metric::OfficeHoursAttendance,
        Metric::DocumentationViews,
        Metric::TemplatesUsed,
        Metric::AccountAgeDays,
    ];

    /// The six community channels (every metric except account age)
    pub const CHANNELS: [Metric; 6] = [
        Metric::ForumPosts,
        Metric::DiscordMessages,
        Metric::WebinarAttendance,
        Metric::OfficeHoursAttendance,
        Metric::DocumentationViews,
        Metric::TemplatesUsed,
    ];

    /// Column name in the output table
    pub fn column_name(self) -> &'static str {
        match self {
            Metric::ForumPosts => "forum_posts",
            Metric::DiscordMessages => "discord_messages",
            Metric::WebinarAttendance => "webinar_attendance",
            Metric::OfficeHoursAttendance => "office_hours_attendance",
            Metric::DocumentationViews => "documentation_views",
            Metric::TemplatesUsed => "templates_used",
            Metric::AccountAgeDays => "account_age_days",
        }
    }

    /// Title-cased label for charts, e.g. "Discord Messages"
    pub fn display_name(self) -> String {
        self.column_name()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Column index in the feature matrix
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Engagement counters for a single synthetic user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementRecord {
    pub user_id: u32,
    pub forum_posts: u32,
    pub discord_messages: u32,
    pub webinar_attendance: u32,
    pub office_hours_attendance: u32,
    pub documentation_views: u32,
    pub templates_used: u32,
    pub account_age_days: u32,
}

impl EngagementRecord {
    /// Value of one metric
    pub fn metric(&self, metric: Metric) -> u32 {
        match metric {
            Metric::ForumPosts => self.forum_posts,
            Metric::DiscordMessages => self.discord_messages,
            Metric::WebinarAttendance => self.webinar_attendance,
            Metric::OfficeHoursAttendance => self.office_hours_attendance,
            Metric::DocumentationViews => self.documentation_views,
            Metric::TemplatesUsed => self.templates_used,
            Metric::AccountAgeDays => self.account_age_days,
        }
    }

    /// The seven numeric features in column order
    pub fn features(&self) -> [f64; N_FEATURES] {
        Metric::ALL.map(|m| f64::from(self.metric(m)))
    }
}

/// Generate `n_users` records with independently drawn counters
///
/// User ids run from 1 to `n_users`. The caller owns the RNG, so seeding it
/// makes the table reproducible.
pub fn generate_records<R: Rng + ?Sized>(n_users: usize, rng: &mut R) -> Vec<EngagementRecord> {
    (1..=n_users)
        .map(|id| EngagementRecord {
            user_id: id as u32,
            forum_posts: rng.gen_range(0..50),
            discord_messages: rng.gen_range(0..200),
            webinar_attendance: rng.gen_range(0..10),
            office_hours_attendance: rng.gen_range(0..5),
            documentation_views: rng.gen_range(0..300),
            templates_used: rng.gen_range(0..20),
            account_age_days: rng.gen_range(1..=365),
        })
        .collect()
}

/// Build the `(n_records, 7)` feature matrix, row-aligned with `records`
pub fn feature_matrix(records: &[EngagementRecord]) -> Array2<f64> {
    let mut features = Array2::zeros((records.len(), N_FEATURES));
    for (mut row, record) in features.outer_iter_mut().zip(records) {
        for (cell, value) in row.iter_mut().zip(record.features()) {
            *cell = value;
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_user_ids_unique_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let records = generate_records(500, &mut rng);

        assert_eq!(records.len(), 500);
        let ids: HashSet<u32> = records.iter().map(|r| r.user_id).collect();
        assert_eq!(ids.len(), 500);
        assert!(ids.iter().all(|&id| (1..=500).contains(&id)));
    }

    #[test]
    fn test_counters_within_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        for r in generate_records(2000, &mut rng) {
            assert!(r.forum_posts < 50);
            assert!(r.discord_messages < 200);
            assert!(r.webinar_attendance < 10);
            assert!(r.office_hours_attendance < 5);
            assert!(r.documentation_views < 300);
            assert!(r.templates_used < 20);
            assert!((1..=365).contains(&r.account_age_days));
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate_records(100, &mut StdRng::seed_from_u64(3));
        let b = generate_records(100, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_feature_matrix_shape_and_order() {
        let mut rng = StdRng::seed_from_u64(5);
        let records = generate_records(10, &mut rng);
        let features = feature_matrix(&records);

        assert_eq!(features.shape(), &[10, N_FEATURES]);
        assert_eq!(features[[3, 1]], f64::from(records[3].discord_messages));
        assert_eq!(features[[9, 6]], f64::from(records[9].account_age_days));
    }

    #[test]
    fn test_metric_names() {
        assert_eq!(Metric::OfficeHoursAttendance.column_name(), "office_hours_attendance");
        assert_eq!(Metric::DiscordMessages.display_name(), "Discord Messages");
        assert_eq!(Metric::AccountAgeDays.index(), 6);
        assert!(!Metric::CHANNELS.contains(&Metric::AccountAgeDays));
    }
}
