//! Plotters-powered rate comparison chart widget for Ratatui.
//!
//! One vertical bar per price source (earnings range, unverified rental band,
//! verified rental band) on a shared USD/hour axis, plus a dot for the average
//! earning rate. Rendered into the Ratatui buffer via `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{MergedDevice, PriceQuote};

/// Bar slots on the x axis.
pub const SLOT_LABELS: [&str; 3] = ["Salad", "Unverif.", "Verified"];

/// A vertical low..high range at one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBar {
    pub slot: usize,
    pub low: f64,
    pub high: f64,
}

/// Chart data for one device. Bars with an unknown end are left out.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateSeries {
    pub bars: Vec<RateBar>,
    /// Average earning rate at slot 0, when known.
    pub average: Option<f64>,
    pub y_max: f64,
}

impl RateSeries {
    pub fn for_device(device: &MergedDevice) -> Self {
        let primary = &device.earning_rates_primary;
        let secondary = &device.earning_rates_secondary;

        let mut bars = Vec::new();
        if let (Some(low), Some(high)) = (primary.min_earning_rate, primary.max_earning_rate) {
            bars.push(RateBar { slot: 0, low, high });
        }
        for (slot, quote) in [(1, secondary.unverified.as_ref()), (2, secondary.verified.as_ref())] {
            if let Some(bar) = quote.and_then(|q| band_bar(slot, q)) {
                bars.push(bar);
            }
        }

        let average = primary.avg_earning_rate;
        let top = bars
            .iter()
            .map(|b| b.high.max(b.low))
            .chain(average)
            .fold(0.0_f64, f64::max);
        let y_max = if top.is_finite() && top > 0.0 { top * 1.15 } else { 1.0 };

        Self { bars, average, y_max }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty() && self.average.is_none()
    }
}

fn band_bar(slot: usize, quote: &PriceQuote) -> Option<RateBar> {
    Some(RateBar {
        slot,
        low: quote.price_10th?,
        high: quote.price_90th?,
    })
}

/// A render-only chart over a prepared [`RateSeries`].
pub struct RatePlottersChart<'a> {
    pub series: &'a RateSeries,
    pub y_label: &'a str,
}

impl<'a> Widget for RatePlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let y1 = self.series.y_max;
        if !y1.is_finite() || y1 <= 0.0 {
            return;
        }
        let series = self.series;
        let y_label = self.y_label;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(-0.5_f64..2.5_f64, 0.0_f64..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(y_label)
                .x_labels(SLOT_LABELS.len())
                .y_labels(5)
                .x_label_formatter(&|v| slot_label(*v))
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let palette = [
                RGBColor(0, 255, 0),   // earnings: green
                RGBColor(255, 255, 0), // unverified: yellow
                RGBColor(0, 255, 255), // verified: cyan
            ];

            for bar in &series.bars {
                let x = bar.slot as f64;
                let color = palette[bar.slot % palette.len()];
                chart.draw_series(LineSeries::new([(x, bar.low), (x, bar.high)], &color))?;
                for y in [bar.low, bar.high] {
                    chart.draw_series(LineSeries::new([(x - 0.15, y), (x + 0.15, y)], &color))?;
                }
            }

            // `Circle` radii are mapped incorrectly by the backend; a pixel
            // renders as a clean dot.
            if let Some(avg) = series.average {
                chart.draw_series(std::iter::once(Pixel::new((0.0, avg), WHITE)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

fn slot_label(v: f64) -> String {
    let rounded = v.round();
    if (v - rounded).abs() > 0.05 || rounded < 0.0 {
        return String::new();
    }
    SLOT_LABELS
        .get(rounded as usize)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PrimaryRates, RecommendedSpecs, SecondaryRates};

    fn device(primary: PrimaryRates, secondary: SecondaryRates) -> MergedDevice {
        MergedDevice {
            name: "RTX 3070".to_string(),
            display_name: "RTX 3070".to_string(),
            variant_names: Vec::new(),
            recommended_specs: RecommendedSpecs::default(),
            earning_rates_primary: primary,
            utilization_pct: None,
            earning_rates_secondary: secondary,
        }
    }

    #[test]
    fn series_includes_only_complete_ranges() {
        let d = device(
            PrimaryRates {
                avg_earning_rate: Some(0.12),
                min_earning_rate: Some(0.05),
                max_earning_rate: Some(0.2),
                ..PrimaryRates::default()
            },
            SecondaryRates {
                verified: Some(PriceQuote {
                    price_10th: Some(0.1),
                    price_90th: Some(0.4),
                    count: Some(5),
                }),
                unverified: Some(PriceQuote {
                    price_10th: Some(0.08),
                    price_90th: None,
                    count: None,
                }),
            },
        );
        let series = RateSeries::for_device(&d);
        assert_eq!(
            series.bars,
            vec![
                RateBar { slot: 0, low: 0.05, high: 0.2 },
                RateBar { slot: 2, low: 0.1, high: 0.4 },
            ]
        );
        assert_eq!(series.average, Some(0.12));
        assert!((series.y_max - 0.46).abs() < 1e-9);
    }

    #[test]
    fn empty_device_gets_unit_axis() {
        let series = RateSeries::for_device(&device(PrimaryRates::default(), SecondaryRates::UNAVAILABLE));
        assert!(series.is_empty());
        assert_eq!(series.y_max, 1.0);
    }

    #[test]
    fn slot_labels_only_on_integer_ticks() {
        assert_eq!(slot_label(0.0), "Salad");
        assert_eq!(slot_label(2.0), "Verified");
        assert_eq!(slot_label(0.5), "");
        assert_eq!(slot_label(-0.5), "");
        assert_eq!(slot_label(3.0), "");
    }
}
