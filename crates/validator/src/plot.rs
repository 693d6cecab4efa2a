//! SVG diagnostic charts drawn with plotters.

use std::collections::BTreeMap;

use plotters::{coord::Shift, prelude::*};
use qdl_primitives::{AlignedObservations, Date, Figure, PlotOptions};
use qdl_stats::PCT_SCALE;
use qdl_traits::{FigureRenderer, RenderError};

const USER_COLOR: RGBColor = RGBColor(31, 119, 180);
const REFERENCE_COLOR: RGBColor = RGBColor(255, 127, 14);
const ERROR_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Renders cumulative-return overlays and an error-over-time panel as SVG.
///
/// Without an entity dimension the top area holds one overlay of cumulative
/// sums. With one, it holds a small overlay per entity, up to
/// [`PlotOptions::max_entities`]. The bottom area plots the mean
/// percentage-point error at each time point.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    /// Create a renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn drawing<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn cumsum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

fn bounds<'a>(series: impl IntoIterator<Item = &'a [f64]>) -> (f64, f64) {
    let (lo, hi) = series
        .into_iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}

/// Mean percentage-point error per time point (or per observation without time).
fn error_path(obs: &AlignedObservations) -> (Vec<Option<Date>>, Vec<f64>) {
    let diffs = obs.user.iter().zip(&obs.reference).map(|(u, r)| (u - r) * PCT_SCALE);
    match &obs.time {
        Some(time) => {
            let mut by_date: BTreeMap<Date, (f64, usize)> = BTreeMap::new();
            for (date, diff) in time.iter().zip(diffs) {
                let slot = by_date.entry(*date).or_default();
                slot.0 += diff;
                slot.1 += 1;
            }
            by_date.into_iter().map(|(d, (sum, n))| (Some(d), sum / n as f64)).unzip()
        }
        None => (vec![None; obs.len()], diffs.collect()),
    }
}

fn x_label(dates: &[Option<Date>], x: f64) -> String {
    let i = x.round();
    if i < 0.0 {
        return String::new();
    }
    match dates.get(i as usize) {
        Some(Some(d)) => d.format("%Y-%m").to_string(),
        Some(None) => format!("{i:.0}"),
        None => String::new(),
    }
}

fn draw_overlay<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    caption: &str,
    dates: &[Option<Date>],
    user: &[f64],
    reference: &[f64],
    font_size: u32,
) -> Result<(), RenderError> {
    let user = cumsum(user);
    let reference = cumsum(reference);
    let (lo, hi) = bounds([user.as_slice(), reference.as_slice()]);
    let x_max = user.len().max(2) as f64 - 1.0;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", font_size))
        .margin(8)
        .set_label_area_size(LabelAreaPosition::Left, 40)
        .set_label_area_size(LabelAreaPosition::Bottom, 24)
        .build_cartesian_2d(0.0..x_max, lo..hi)
        .map_err(drawing)?;
    let fmt = |x: &f64| x_label(dates, *x);
    chart
        .configure_mesh()
        .x_labels(5)
        .y_labels(5)
        .x_label_formatter(&fmt)
        .draw()
        .map_err(drawing)?;

    chart
        .draw_series(LineSeries::new(user.iter().enumerate().map(|(i, v)| (i as f64, *v)), &USER_COLOR))
        .map_err(drawing)?
        .label("user")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], USER_COLOR));
    chart
        .draw_series(LineSeries::new(
            reference.iter().enumerate().map(|(i, v)| (i as f64, *v)),
            &REFERENCE_COLOR,
        ))
        .map_err(drawing)?
        .label("reference")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], REFERENCE_COLOR));
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(drawing)
}

fn draw_error<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    obs: &AlignedObservations,
) -> Result<(), RenderError> {
    let (dates, errors) = error_path(obs);
    let (lo, hi) = bounds([errors.as_slice()]);
    let x_max = errors.len().max(2) as f64 - 1.0;

    let mut chart = ChartBuilder::on(area)
        .caption("Error (percentage points)", ("sans-serif", 16))
        .margin(8)
        .set_label_area_size(LabelAreaPosition::Left, 40)
        .set_label_area_size(LabelAreaPosition::Bottom, 24)
        .build_cartesian_2d(0.0..x_max, lo..hi)
        .map_err(drawing)?;
    let fmt = |x: &f64| x_label(&dates, *x);
    chart
        .configure_mesh()
        .x_labels(8)
        .y_labels(5)
        .x_label_formatter(&fmt)
        .draw()
        .map_err(drawing)?;
    chart
        .draw_series(LineSeries::new(
            errors.iter().enumerate().map(|(i, v)| (i as f64, *v)),
            &ERROR_COLOR,
        ))
        .map_err(drawing)?;
    Ok(())
}

fn draw_entities<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    obs: &AlignedObservations,
    entity: &[String],
    max_entities: usize,
) -> Result<(), RenderError> {
    let names: Vec<&str> = obs.entities().into_iter().take(max_entities.max(1)).collect();
    let cols = (names.len() as f64).sqrt().ceil().max(1.0) as usize;
    let rows = names.len().div_ceil(cols);
    let panels = area.split_evenly((rows, cols));

    for (name, panel) in names.iter().zip(panels.iter()) {
        let mut dates = Vec::new();
        let mut user = Vec::new();
        let mut reference = Vec::new();
        for (i, e) in entity.iter().enumerate() {
            if e == name {
                dates.push(obs.time.as_ref().map(|t| t[i]));
                user.push(obs.user[i]);
                reference.push(obs.reference[i]);
            }
        }
        draw_overlay(panel, name, &dates, &user, &reference, 12)?;
    }
    Ok(())
}

impl FigureRenderer for SvgRenderer {
    fn render(
        &self,
        observations: &AlignedObservations,
        options: &PlotOptions,
    ) -> Result<Figure, RenderError> {
        if observations.is_empty() {
            return Err(RenderError::EmptyData);
        }

        let mut svg = String::new();
        {
            let root =
                SVGBackend::with_string(&mut svg, (options.width, options.height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing)?;
            let root = root.titled(&options.title, ("sans-serif", 22)).map_err(drawing)?;
            let split = i32::try_from(options.height).unwrap_or(i32::MAX) * 2 / 3;
            let (top, bottom) = root.split_vertically(split);

            match &observations.entity {
                Some(entity) => draw_entities(&top, observations, entity, options.max_entities)?,
                None => {
                    let dates: Vec<Option<Date>> = match &observations.time {
                        Some(time) => time.iter().copied().map(Some).collect(),
                        None => vec![None; observations.len()],
                    };
                    draw_overlay(
                        &top,
                        "Cumulative sum",
                        &dates,
                        &observations.user,
                        &observations.reference,
                        16,
                    )?;
                }
            }
            draw_error(&bottom, observations)?;
            root.present().map_err(drawing)?;
        }

        Ok(Figure { title: options.title.clone(), svg })
    }

    fn name(&self) -> &str {
        "svg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32) -> Date {
        Date::from_ymd_opt(2022, m, 28).unwrap()
    }

    #[test]
    fn cumsum_accumulates() {
        assert_eq!(cumsum(&[1.0, 2.0, -0.5]), vec![1.0, 3.0, 2.5]);
    }

    #[test]
    fn error_path_averages_per_date() {
        let obs = AlignedObservations {
            time: Some(vec![d(1), d(1), d(2)]),
            entity: None,
            user: vec![0.02, 0.04, 0.01],
            reference: vec![0.01, 0.01, 0.01],
        };
        let (dates, errors) = error_path(&obs);
        assert_eq!(dates, vec![Some(d(1)), Some(d(2))]);
        assert!((errors[0] - 2.0).abs() < 1e-9);
        assert!(errors[1].abs() < 1e-9);
    }

    #[test]
    fn renders_svg_document() {
        let obs = AlignedObservations {
            time: Some(vec![d(1), d(2), d(1), d(2)]),
            entity: Some(vec!["a".into(), "a".into(), "b".into(), "b".into()]),
            user: vec![0.01, 0.02, 0.03, -0.01],
            reference: vec![0.01, 0.015, 0.02, -0.01],
        };
        let figure = SvgRenderer::new().render(&obs, &PlotOptions::titled("check")).unwrap();
        assert_eq!(figure.title, "check");
        assert!(figure.svg.contains("<svg"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = SvgRenderer.render(&AlignedObservations::default(), &PlotOptions::default());
        assert!(matches!(err, Err(RenderError::EmptyData)));
    }
}
