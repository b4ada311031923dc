#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::cast_precision_loss)]

use keyed_tables::{ChainingMap, ContainerExtensions, KeyedContainer, ProbingMap};
use plotters::prelude::*;
use rand::Rng;

// Largest fill level, reached in NUM_STEPS even increments
const MAX_KEYS: usize = 200_000;
const NUM_STEPS: usize = 10;

// Map engines to compare, in the order `measure_all` returns them
const METHODS: [&str; 2] = ["Quadratic Probing", "Separate Chaining"];

/// Probe statistics of one engine at one fill level
#[derive(Debug, Clone, Copy)]
struct Sample {
    avg_probes: f64,
    worst_probes: usize,
    load_factor: f64,
}

// Fills a fresh container with `keys` and looks every one of them up again
fn measure<C>(keys: &[usize]) -> Sample
where
    C: KeyedContainer<usize, usize> + Default,
{
    let mut map = C::default();
    for &key in keys {
        map.insert(key, key);
    }

    let probes: Vec<usize> = keys.iter().map(|key| map.probe_length(key)).collect();
    let avg_probes = probes.iter().sum::<usize>() as f64 / probes.len().max(1) as f64;
    let worst_probes = probes.iter().copied().max().unwrap_or(0);

    Sample { avg_probes, worst_probes, load_factor: map.load_factor() }
}

fn measure_all(keys: &[usize]) -> [Sample; 2] {
    [measure::<ProbingMap<usize, usize>>(keys), measure::<ChainingMap<usize, usize>>(keys)]
}

// Draws one line per method into `path`
fn plot(
    path: &str,
    caption: &str,
    y_desc: &str,
    x_labels: &[String],
    series: &[Vec<f64>],
) -> Result<(), Box<dyn std::error::Error>> {
    let font_family = "sans-serif";
    let colors = [
        RGBColor(220, 50, 50), // Bright red
        RGBColor(50, 90, 220), // Bright blue
    ];
    let line_width = 2;
    let marker_size = 4;
    let text_size = 16;
    let title_size = 35;

    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = series
        .iter()
        .flat_map(|v| v.iter())
        .fold(0.0, |max, &y| if y > max { y } else { max }) *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (font_family, title_size))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .right_y_label_area_size(10)
        .build_cartesian_2d(0..x_labels.len(), 0.0..max_y.max(1.0))?;

    chart
        .configure_mesh()
        .x_labels(x_labels.len())
        .x_label_formatter(&|x| x_labels.get(*x).cloned().unwrap_or_default())
        .x_desc("Number of Keys Inserted")
        .y_desc(y_desc)
        .axis_desc_style((font_family, text_size))
        .draw()?;

    for (method_idx, &method) in METHODS.iter().enumerate() {
        let color = &colors[method_idx % colors.len()];
        let line_style = ShapeStyle::from(color).stroke_width(line_width);
        let points = &series[method_idx];

        chart
            .draw_series(LineSeries::new(points.iter().copied().enumerate(), line_style))?
            .label(method)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series(
            points
                .iter()
                .enumerate()
                .map(|(i, &y)| Circle::new((i, y), marker_size, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let num_keys: Vec<usize> = (1..=NUM_STEPS).map(|step| MAX_KEYS * step / NUM_STEPS).collect();
    println!("Number of keys: {num_keys:?}");

    // Generate random keys once so every engine sees the same input
    let mut rng = rand::rng();
    let keys: Vec<usize> = (0..MAX_KEYS).map(|_| rng.random_range(0..usize::MAX)).collect();

    let mut average_probes: Vec<Vec<f64>> = vec![Vec::new(); METHODS.len()];
    let mut worst_case_probes: Vec<Vec<f64>> = vec![Vec::new(); METHODS.len()];

    for &n_keys in &num_keys {
        println!("Testing with {n_keys} keys");

        for (method_idx, sample) in measure_all(&keys[..n_keys]).iter().enumerate() {
            println!(
                "  {}: Avg probes = {:.2}, Worst = {}, Load factor = {:.2}",
                METHODS[method_idx], sample.avg_probes, sample.worst_probes, sample.load_factor
            );
            average_probes[method_idx].push(sample.avg_probes);
            worst_case_probes[method_idx].push(sample.worst_probes as f64);
        }
    }

    let x_labels: Vec<String> = num_keys.iter().map(ToString::to_string).collect();
    plot(
        "probe_length.png",
        "Average Probe Length per Lookup",
        "Average entries inspected",
        &x_labels,
        &average_probes,
    )?;
    plot(
        "worst_case_probes.png",
        "Worst-Case Probe Length",
        "Most entries inspected by one lookup",
        &x_labels,
        &worst_case_probes,
    )?;

    println!("Generated plot images: probe_length.png, worst_case_probes.png");

    Ok(())
}
