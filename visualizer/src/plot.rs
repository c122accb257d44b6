use iced::{
    mouse,
    widget::canvas::{self, Cache, Frame, Geometry, Path, Stroke, Text},
    Color, Point, Rectangle, Renderer, Theme,
};
use sondecore::spectrum::{format_tick, tick_count, ScanChart};

const AXIS_HEIGHT: f32 = 18.0;

/// Scan chart drawn from a cached frame; the cache is cleared only when the
/// chart takes a new sweep.
pub struct SpectrumPlot<'a> {
    pub chart: &'a ScanChart,
    pub cache: &'a Cache,
}

impl<'a> SpectrumPlot<'a> {
    fn project(&self, bounds: Rectangle, mhz: f64, db: f64) -> Point {
        let limits = self.chart.limits();
        let (lo, hi) = self.chart.power_bounds();
        let span = (limits.max_freq - limits.min_freq).max(f64::EPSILON);
        let plot_height = (bounds.height - AXIS_HEIGHT).max(1.0);
        let x = ((mhz - limits.min_freq) / span) as f32 * bounds.width;
        let normalized = ((db - lo) / (hi - lo)) as f32;
        Point::new(x, plot_height - normalized * plot_height)
    }

    fn draw_series(
        &self,
        frame: &mut Frame,
        bounds: Rectangle,
        points: &[(f64, f64)],
        color: Color,
    ) {
        if points.len() < 2 {
            return;
        }
        let path = Path::new(|builder| {
            for (i, &(mhz, db)) in points.iter().enumerate() {
                let point = self.project(bounds, mhz, db);
                if i == 0 {
                    builder.move_to(point);
                } else {
                    builder.line_to(point);
                }
            }
        });
        frame.stroke(&path, Stroke::default().with_width(2.0).with_color(color));
    }
}

impl<'a, Message> canvas::Program<Message> for SpectrumPlot<'a> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self.cache.draw(renderer, bounds.size(), |frame| {
            frame.fill_rectangle(
                Point::ORIGIN,
                bounds.size(),
                Color::from_rgb(0.05, 0.05, 0.05),
            );

            self.draw_series(
                frame,
                bounds,
                self.chart.spectra(),
                Color::from_rgb(0.18, 0.72, 0.89),
            );
            self.draw_series(
                frame,
                bounds,
                self.chart.threshold(),
                Color::from_rgb(0.85, 0.25, 0.25),
            );

            for &(mhz, db) in self.chart.peaks() {
                let centre = self.project(bounds, mhz, db);
                let marker = Path::new(|builder| builder.circle(centre, 5.0));
                frame.fill(&marker, Color::from_rgb(0.95, 0.55, 0.2));
            }

            let limits = self.chart.limits();
            let ticks = tick_count(bounds.width);
            for i in 0..ticks {
                let fraction = i as f64 / (ticks - 1) as f64;
                let mhz = limits.min_freq + fraction * (limits.max_freq - limits.min_freq);
                frame.fill_text(Text {
                    content: format_tick(mhz),
                    position: Point::new(
                        fraction as f32 * (bounds.width - 48.0),
                        bounds.height - AXIS_HEIGHT + 2.0,
                    ),
                    color: Color::from_rgb(0.7, 0.7, 0.7),
                    ..Text::default()
                });
            }
        });

        vec![geometry]
    }
}
