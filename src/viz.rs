//! Visualization functions using Plotters for segment analysis

use crate::data::Metric;
use crate::insights::{
    analyze_clusters, channel_totals, metric_max, metric_mean, most_active_segment,
    segment_names, top_channel, top_segments_by, ChannelTotal,
};
use crate::pipeline::PipelineOutput;
use crate::table::SegmentedRecord;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::{Path, PathBuf};

/// Color palette for different segments
const SEGMENT_COLORS: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

/// Heatmap gradient endpoints (low → high)
const HEAT_LOW: RGBColor = RGBColor(68, 1, 84);
const HEAT_HIGH: RGBColor = RGBColor(253, 231, 37);

fn segment_color(index: usize) -> RGBColor {
    SEGMENT_COLORS[index % SEGMENT_COLORS.len()]
}

/// Linear blend between the heatmap endpoints for `t` in [0, 1]
fn heat_color(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    RGBColor(
        mix(HEAT_LOW.0, HEAT_HIGH.0),
        mix(HEAT_LOW.1, HEAT_HIGH.1),
        mix(HEAT_LOW.2, HEAT_HIGH.2),
    )
}

/// What the report shows
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Segments to include; `None` keeps all of them
    pub segments: Option<Vec<String>>,
    pub x_axis: Metric,
    pub y_axis: Metric,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            segments: None,
            x_axis: Metric::DiscordMessages,
            y_axis: Metric::WebinarAttendance,
        }
    }
}

/// Paths of the charts written by [`generate_report`]
#[derive(Debug, Clone)]
pub struct ReportFiles {
    pub bar_chart: PathBuf,
    pub scatter_plot: PathBuf,
    pub heatmap: PathBuf,
}

/// Grouped bar chart of total engagement per channel, one bar per segment
pub fn create_engagement_bar_chart(totals: &[ChannelTotal], output_path: &Path) -> anyhow::Result<()> {
    let segments: Vec<&str> = {
        let mut names: Vec<&str> = totals.iter().map(|t| t.segment.as_str()).collect();
        names.dedup();
        names
    };
    let n_channels = Metric::CHANNELS.len();
    let max_total = totals.iter().map(|t| t.engagement).max().unwrap_or(1).max(1) as f64;

    let root = SVGBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Community Engagement Distribution", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..n_channels as f64, 0f64..max_total * 1.1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n_channels)
        .x_label_formatter(&|x| {
            Metric::CHANNELS
                .get(x.floor() as usize)
                .map(|m| m.display_name())
                .unwrap_or_default()
        })
        .x_desc("Community Channel")
        .y_desc("Total Engagement")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    let bar_width = 0.8 / segments.len().max(1) as f64;
    for (seg_idx, segment) in segments.iter().enumerate() {
        let color = segment_color(seg_idx);
        let bars = totals
            .iter()
            .filter(|t| t.segment == *segment)
            .map(|t| {
                let left = t.channel.index() as f64 + 0.1 + seg_idx as f64 * bar_width;
                Rectangle::new(
                    [(left, 0.0), (left + bar_width, t.engagement as f64)],
                    color.filled(),
                )
            })
            .collect::<Vec<_>>();

        chart
            .draw_series(bars)?
            .label(segment.to_string())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    log::info!("Bar chart saved to: {}", output_path.display());

    Ok(())
}

/// Scatter plot of two metrics, colored by segment, sized by templates used,
/// with dashed mean benchmark lines
///
/// # Arguments
/// * `rows` - Segmented rows to plot (already filtered)
/// * `x_axis` - Metric on the horizontal axis
/// * `y_axis` - Metric on the vertical axis
/// * `output_path` - Path of the SVG file to write
///
/// # Returns
/// * Result indicating success or failure
pub fn create_scatter_plot(
    rows: &[&SegmentedRecord],
    x_axis: Metric,
    y_axis: Metric,
    output_path: &Path,
) -> anyhow::Result<()> {
    let x_max = f64::from(metric_max(rows, x_axis).unwrap_or(1).max(1));
    let y_max = f64::from(metric_max(rows, y_axis).unwrap_or(1).max(1));
    let title = format!(
        "Customer Segments: {} vs {}",
        x_axis.display_name(),
        y_axis.display_name()
    );

    let root = SVGBackend::new(output_path, (900, 650)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max * 1.05, 0f64..y_max * 1.05)?;

    chart
        .configure_mesh()
        .x_desc(x_axis.display_name())
        .y_desc(y_axis.display_name())
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (seg_idx, segment) in segment_names(rows).into_iter().enumerate() {
        let color = segment_color(seg_idx);
        let points = rows
            .iter()
            .filter(|r| r.segment == segment)
            .map(|r| {
                let x = f64::from(r.record.metric(x_axis));
                let y = f64::from(r.record.metric(y_axis));
                let size = 2 + r.record.templates_used / 3;
                Circle::new((x, y), size, color.mix(0.6).filled())
            })
            .collect::<Vec<_>>();

        chart
            .draw_series(points)?
            .label(segment)
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    if let (Some(x_mean), Some(y_mean)) = (metric_mean(rows, x_axis), metric_mean(rows, y_axis)) {
        chart
            .draw_series(DashedLineSeries::new(
                vec![(x_mean, 0.0), (x_mean, y_max)],
                8,
                6,
                RED.stroke_width(2),
            ))?
            .label("X-Axis Mean")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], RED));
        chart
            .draw_series(DashedLineSeries::new(
                vec![(0.0, y_mean), (x_max, y_mean)],
                8,
                6,
                BLUE.stroke_width(2),
            ))?
            .label("Y-Axis Mean")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], BLUE));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    log::info!("Scatter plot saved to: {}", output_path.display());

    Ok(())
}

/// Heatmap of total engagement, segments × channels
pub fn create_engagement_heatmap(totals: &[ChannelTotal], output_path: &Path) -> anyhow::Result<()> {
    let segments: Vec<&str> = {
        let mut names: Vec<&str> = totals.iter().map(|t| t.segment.as_str()).collect();
        names.dedup();
        names
    };
    let n_channels = Metric::CHANNELS.len();
    let n_segments = segments.len().max(1);
    let max_total = totals.iter().map(|t| t.engagement).max().unwrap_or(0).max(1) as f64;

    let root = SVGBackend::new(output_path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Engagement Heatmap: Customer Segments vs Channels", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(240)
        .build_cartesian_2d(0f64..n_channels as f64, 0f64..n_segments as f64)?;

    let segment_labels = segments.clone();
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n_channels)
        .y_labels(n_segments)
        .x_label_formatter(&|x| {
            Metric::CHANNELS
                .get(x.floor() as usize)
                .map(|m| m.display_name())
                .unwrap_or_default()
        })
        .y_label_formatter(&|y| {
            segment_labels
                .get(y.floor() as usize)
                .map(|s| s.to_string())
                .unwrap_or_default()
        })
        .x_desc("Community Channel")
        .y_desc("Customer Segment")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(totals.iter().filter_map(|t| {
        let row = segments.iter().position(|s| *s == t.segment)? as f64;
        let col = t.channel.index() as f64;
        let color = heat_color(t.engagement as f64 / max_total);
        Some(Rectangle::new([(col, row), (col + 1.0, row + 1.0)], color.filled()))
    }))?;

    root.present()?;
    log::info!("Heatmap saved to: {}", output_path.display());

    Ok(())
}

/// Print cluster statistics to console
pub fn print_cluster_statistics(output: &PipelineOutput) {
    let model = &output.model;
    let total = output.rows.len();

    println!("\n=== Cluster Statistics ===");
    println!("Number of clusters: {}", model.n_clusters());
    println!("Total users: {}", total);
    println!("Within-cluster sum of squares (Inertia): {:.2}", model.inertia);

    println!("\nCluster sizes:");
    for (i, &size) in model.cluster_sizes().iter().enumerate() {
        let percentage = (size as f64 / total as f64) * 100.0;
        let segment = output.config.segment_map.get(i).unwrap_or("?");
        println!("  Cluster {} ({}): {} users ({:.1}%)", i, segment, size, percentage);
    }

    println!("\nCluster averages:");
    println!("  Cluster | Forum | Discord | Webinar | Office | Docs   | Templates | Age");
    println!("  --------|-------|---------|---------|--------|--------|-----------|------");
    for insight in analyze_clusters(&output.rows) {
        println!(
            "  {:7} | {:5.1} | {:7.1} | {:7.2} | {:6.2} | {:6.1} | {:9.2} | {:5.1}",
            insight.cluster,
            insight.avg_forum_posts,
            insight.avg_discord_messages,
            insight.avg_webinar_attendance,
            insight.avg_office_hours,
            insight.avg_doc_views,
            insight.avg_templates,
            insight.avg_account_age
        );
    }

    println!("\nCluster centroids (scaled):");
    for (i, centroid_row) in model.centroids.outer_iter().enumerate() {
        let values: Vec<String> = centroid_row.iter().map(|v| format!("{:6.2}", v)).collect();
        println!("  {:7} | {}", i, values.join(" "));
    }
}

/// Print quick insights and key insights for the selected rows
pub fn print_key_insights(rows: &[&SegmentedRecord]) {
    println!("\n=== Quick Insights ===");
    println!("Top engaged segments by Discord messages:");
    for (segment, total) in top_segments_by(rows, Metric::DiscordMessages, 3) {
        println!("  {}: {}", segment, total);
    }

    println!("\n=== Key Insights ===");
    match most_active_segment(rows, Metric::DiscordMessages) {
        Some(segment) => println!("The most active segment on Discord is {}.", segment),
        None => println!("No segments selected."),
    }
    if let Some(channel) = top_channel(rows) {
        println!("The highest-engaging channel overall is {}.", channel);
    }
}

/// Generate all charts plus the console report
///
/// # Arguments
/// * `output` - Result of a pipeline run
/// * `options` - Segment filter and scatter plot axes
/// * `output_dir` - Directory for the SVG files, created if missing
///
/// # Returns
/// * `ReportFiles` with the path of each chart written
pub fn generate_report(
    output: &PipelineOutput,
    options: &ReportOptions,
    output_dir: &Path,
) -> anyhow::Result<ReportFiles> {
    std::fs::create_dir_all(output_dir)?;

    let selected: Vec<&SegmentedRecord> = match &options.segments {
        Some(names) => crate::insights::filter_segments(&output.rows, names),
        None => output.rows.iter().collect(),
    };
    if selected.is_empty() {
        log::warn!("No rows match the selected segments");
    }

    let totals = channel_totals(&selected);
    let files = ReportFiles {
        bar_chart: output_dir.join("engagement_by_channel.svg"),
        scatter_plot: output_dir.join(format!("{}_vs_{}.svg", options.x_axis, options.y_axis)),
        heatmap: output_dir.join("engagement_heatmap.svg"),
    };

    create_engagement_bar_chart(&totals, &files.bar_chart)?;
    create_scatter_plot(&selected, options.x_axis, options.y_axis, &files.scatter_plot)?;
    create_engagement_heatmap(&totals, &files.heatmap)?;

    print_cluster_statistics(output);
    print_key_insights(&selected);

    Ok(files)
}
