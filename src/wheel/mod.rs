//! Animated wheel selector: slices, spin physics, pointer index and the
//! post-spin highlight pulse.

pub mod geometry;
pub mod label;
pub mod surface;

pub use surface::{DisplayList, DrawCommand, PlacedText, Rgba, Sector, Surface};

use std::f64::consts::TAU;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::oneshot;

use geometry::{
    ease_out_cubic, flip, forward_delta, highlight_opacity, index_under_pointer,
    label_width_budget, landing_offset, needs_flip, pointer_slot, slice_angle, target_rotation,
};
use label::{fit_label, LabelFit};

const RIM: f64 = 12.0;
const LABEL_RADIUS_RATIO: f64 = 0.68;
const LABEL_BASE_SIZE: f64 = 18.0;
const LABEL_MIN_SIZE: f64 = 12.0;
const LABEL_LINE_HEIGHT: f64 = 18.0;
const HUB_OUTER_RADIUS: f64 = 26.0;
const HUB_INNER_RADIUS: f64 = 20.0;

const SLICE_HUES: [f64; 5] = [265.0, 205.0, 155.0, 115.0, 45.0];
const BORDER_COLOR: Rgba = Rgba::rgba(0, 0, 0, 0.35);
const PLACEHOLDER_COLOR: Rgba = Rgba::rgba(255, 255, 255, 0.06);
const LABEL_COLOR: Rgba = Rgba::WHITE;
const HUB_OUTER_COLOR: Rgba = Rgba::rgb(0xea, 0xf0, 0xff);
const HUB_INNER_COLOR: Rgba = Rgba::rgb(0x7c, 0x5c, 0xff);

/// Fill color of slice `index`; depends on position only, not on the label.
pub fn slice_color(index: usize) -> Rgba {
    let hue = SLICE_HUES[index % SLICE_HUES.len()];
    let lightness = 45.0 + ((index * 7) % 15) as f64;
    Rgba::from_hsl(hue, 70.0, lightness)
}

#[derive(Debug, Clone)]
pub struct SpinParams {
    pub min_duration: Duration,
    pub max_duration: Duration,
    pub min_extra_turns: u32,
    pub max_extra_turns: u32,
    pub near_edge_chance: f64,
    pub highlight_period: Duration,
}

impl Default for SpinParams {
    fn default() -> Self {
        Self {
            min_duration: Duration::from_millis(3000),
            max_duration: Duration::from_millis(4200),
            min_extra_turns: 3,
            max_extra_turns: 5,
            near_edge_chance: 0.28,
            highlight_period: Duration::from_millis(1400),
        }
    }
}

/// What a running spin is heading for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub target: usize,
    pub offset: f64,
    pub total: f64,
    pub duration: Duration,
}

/// Pending result of [`Wheel::spin`]. Resolves to the landed index, or to
/// `None` when the spin was rejected.
#[derive(Debug)]
pub struct Spin {
    rx: oneshot::Receiver<Option<usize>>,
}

impl Spin {
    fn resolved(result: Option<usize>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { rx }
    }

    /// Non-blocking check: `Some(result)` once the spin has finished.
    pub fn try_result(&mut self) -> Option<Option<usize>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(None),
        }
    }
}

impl Future for Spin {
    type Output = Option<usize>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.ok().flatten())
    }
}

struct Animation {
    plan: SpinPlan,
    from: f64,
    started: Instant,
    slot: i64,
    reply: oneshot::Sender<Option<usize>>,
}

#[derive(Debug, Clone, Copy)]
struct Highlight {
    index: usize,
    anchor: Instant,
    opacity: f64,
}

#[derive(Default)]
struct Hooks {
    on_start: Option<Box<dyn FnMut() + Send>>,
    on_tick: Option<Box<dyn FnMut(usize) + Send>>,
    on_end: Option<Box<dyn FnMut(usize) + Send>>,
}

pub struct Wheel<S: Surface> {
    surface: S,
    items: Vec<String>,
    rotation: f64,
    animation: Option<Animation>,
    highlight: Option<Highlight>,
    params: SpinParams,
    rng: StdRng,
    hooks: Hooks,
}

impl<S: Surface> Wheel<S> {
    pub fn new(surface: S, params: SpinParams) -> Self {
        Self::with_rng(surface, params, StdRng::from_os_rng())
    }

    pub fn with_rng(surface: S, params: SpinParams, rng: StdRng) -> Self {
        let mut wheel = Self {
            surface,
            items: Vec::new(),
            rotation: 0.0,
            animation: None,
            highlight: None,
            params,
            rng,
            hooks: Hooks::default(),
        };
        wheel.draw();
        wheel
    }

    pub fn set_params(&mut self, params: SpinParams) {
        self.params = params;
    }

    pub fn on_start<F: FnMut() + Send + 'static>(&mut self, hook: F) {
        self.hooks.on_start = Some(Box::new(hook));
    }

    pub fn on_tick<F: FnMut(usize) + Send + 'static>(&mut self, hook: F) {
        self.hooks.on_tick = Some(Box::new(hook));
    }

    pub fn on_end<F: FnMut(usize) + Send + 'static>(&mut self, hook: F) {
        self.hooks.on_end = Some(Box::new(hook));
    }

    /// Replace every label and redraw. Rotation is kept.
    pub fn set_items<I, T>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();

        let count = self.items.len();
        if self.highlight.is_some_and(|h| h.index >= count) {
            self.highlight = None;
        }
        if let Some(animation) = self.animation.as_mut() {
            if count > 0 {
                animation.slot = pointer_slot(self.rotation, slice_angle(count)).floor() as i64;
            }
        }

        self.draw();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn is_spinning(&self) -> bool {
        self.animation.is_some()
    }

    pub fn active_spin(&self) -> Option<SpinPlan> {
        self.animation.as_ref().map(|a| a.plan)
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlight.map(|h| h.index)
    }

    pub fn highlight_opacity(&self) -> Option<f64> {
        self.highlight.map(|h| h.opacity)
    }

    /// Whether a spin or highlight pulse still wants frames.
    pub fn needs_frame(&self) -> bool {
        self.animation.is_some() || self.highlight.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn current_index_under_pointer(&self) -> Option<usize> {
        index_under_pointer(self.rotation, self.items.len())
    }

    pub fn clear_highlight(&mut self) {
        if self.highlight.take().is_some() {
            self.draw();
        }
    }

    /// Start a spin. Rejected (resolving to `None`) when there are no items
    /// or a spin is already running.
    pub fn spin(&mut self, now: Instant) -> Spin {
        if self.animation.is_some() || self.items.is_empty() {
            return Spin::resolved(None);
        }
        self.highlight = None;

        let count = self.items.len();
        let slice = slice_angle(count);
        let target = self.rng.random_range(0..count);
        let offset = landing_offset(&mut self.rng, self.params.near_edge_chance);
        let delta = forward_delta(self.rotation, target_rotation(target, offset, slice));

        let min_turns = self.params.min_extra_turns.max(1);
        let max_turns = self.params.max_extra_turns.max(min_turns);
        let turns = self.rng.random_range(min_turns..=max_turns);
        let total = delta + TAU * turns as f64;

        let plan = SpinPlan {
            target,
            offset,
            total,
            duration: self.pick_duration(),
        };
        log::debug!(
            "Spinning to slice {} of {} ({} turns, {:?})",
            target,
            count,
            turns,
            plan.duration
        );

        let (reply, rx) = oneshot::channel();
        self.animation = Some(Animation {
            plan,
            from: self.rotation,
            started: now,
            slot: pointer_slot(self.rotation, slice).floor() as i64,
            reply,
        });

        if let Some(hook) = self.hooks.on_start.as_mut() {
            hook();
        }
        self.draw();

        Spin { rx }
    }

    fn pick_duration(&mut self) -> Duration {
        let min = self.params.min_duration;
        let max = self.params.max_duration;
        if max <= min {
            return min;
        }
        Duration::from_secs_f64(
            self.rng
                .random_range(min.as_secs_f64()..=max.as_secs_f64()),
        )
    }

    /// Advance the spin and highlight to `now` and redraw. Driven once per
    /// display frame; progress depends on elapsed time only.
    pub fn update(&mut self, now: Instant) {
        if let Some(animation) = self.animation.as_ref() {
            let elapsed = now.saturating_duration_since(animation.started);
            let duration = animation.plan.duration;
            let progress = if duration.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
            };
            self.rotation = animation.from + animation.plan.total * ease_out_cubic(progress);
            self.emit_ticks();

            if progress >= 1.0 {
                self.finish_spin(now);
            } else {
                self.draw();
            }
            return;
        }

        if let Some(highlight) = self.highlight.as_mut() {
            let elapsed = now.saturating_duration_since(highlight.anchor);
            highlight.opacity = highlight_opacity(elapsed, self.params.highlight_period);
            self.draw();
        }
    }

    fn emit_ticks(&mut self) {
        let count = self.items.len();
        let Some(animation) = self.animation.as_mut() else {
            return;
        };
        if count == 0 {
            return;
        }

        let slot = pointer_slot(self.rotation, slice_angle(count)).floor() as i64;
        let previous = animation.slot;
        animation.slot = slot;

        if let Some(hook) = self.hooks.on_tick.as_mut() {
            for crossed in (slot..previous).rev() {
                hook(crossed.rem_euclid(count as i64) as usize);
            }
        }
    }

    fn finish_spin(&mut self, now: Instant) {
        let Some(animation) = self.animation.take() else {
            return;
        };

        self.rotation = geometry::normalize(self.rotation);
        let landed = self.current_index_under_pointer();

        if let Some(index) = landed {
            self.highlight = Some(Highlight {
                index,
                anchor: now,
                opacity: 0.0,
            });
            if let Some(hook) = self.hooks.on_end.as_mut() {
                hook(index);
            }
            log::debug!("Wheel landed on slice {}", index);
        } else {
            log::debug!("Wheel emptied during spin, no result");
        }

        let _ = animation.reply.send(landed);
        self.draw();
    }

    fn draw(&mut self) {
        let radius = (self.surface.size() / 2.0 - RIM).max(0.0);
        let count = self.items.len().max(1);
        let slice = slice_angle(count);

        self.surface.clear();

        for i in 0..count {
            let start = self.rotation + i as f64 * slice;
            let sector = Sector {
                start,
                end: start + slice,
                radius,
            };

            let mut color = if self.items.is_empty() {
                PLACEHOLDER_COLOR
            } else {
                slice_color(i)
            };
            if let Some(highlight) = self.highlight.filter(|h| h.index == i) {
                color = color.overlay(Rgba::WHITE, highlight.opacity);
            }

            self.surface.fill_sector(sector, color);
            self.surface.stroke_sector(sector, BORDER_COLOR, 1.0);

            if let Some(label) = self.items.get(i) {
                let placed = self.place_label(label, start + slice / 2.0, radius, slice);
                self.surface.draw_text(placed);
            }
        }

        self.surface.fill_circle(HUB_OUTER_RADIUS, HUB_OUTER_COLOR);
        self.surface.fill_circle(HUB_INNER_RADIUS, HUB_INNER_COLOR);
    }

    fn place_label(&self, label: &str, bisector: f64, radius: f64, slice: f64) -> PlacedText {
        let label_radius = radius * LABEL_RADIUS_RATIO;
        let fit = LabelFit {
            max_width: label_width_budget(radius, label_radius, slice),
            base_size: LABEL_BASE_SIZE,
            min_size: LABEL_MIN_SIZE,
        };
        let fitted = fit_label(label, &fit, |text, size| {
            self.surface.measure_text(text, size)
        });

        PlacedText {
            lines: fitted.lines,
            x: label_radius * bisector.cos(),
            y: label_radius * bisector.sin(),
            angle: if needs_flip(bisector) {
                flip(bisector)
            } else {
                bisector
            },
            font_size: fitted.font_size,
            line_height: LABEL_LINE_HEIGHT,
            color: LABEL_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const FRAME: Duration = Duration::from_millis(16);

    fn wheel(seed: u64) -> Wheel<DisplayList> {
        Wheel::with_rng(
            DisplayList::new(400.0),
            SpinParams::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    fn run_to_end(wheel: &mut Wheel<DisplayList>, start: Instant) -> Instant {
        let mut now = start;
        while wheel.is_spinning() {
            now += FRAME;
            wheel.update(now);
        }
        now
    }

    #[tokio::test]
    async fn empty_wheel_spin_is_a_no_op() {
        let mut w = wheel(1);
        assert_eq!(w.current_index_under_pointer(), None);
        let before = w.rotation();
        let result = w.spin(Instant::now()).await;
        assert_eq!(result, None);
        assert_eq!(w.rotation(), before);
        assert!(!w.is_spinning());
    }

    #[tokio::test]
    async fn spin_while_spinning_is_rejected() {
        let mut w = wheel(2);
        w.set_items(["A", "B", "C"]);
        let start = Instant::now();
        let mut first = w.spin(start);
        let mut second = w.spin(start + FRAME);
        assert_eq!(second.try_result(), Some(None));
        assert_eq!(first.try_result(), None);

        run_to_end(&mut w, start);
        let landed = first.await;
        assert!(landed.is_some());
    }

    #[tokio::test]
    async fn result_matches_pointer_and_plan() {
        let mut w = wheel(3);
        w.set_items(["Ann", "Bob", "Cleo", "Dan", "Eve"]);
        for round in 0..10 {
            let start = Instant::now() + Duration::from_secs(10 * round);
            let spin = w.spin(start);
            let plan = w.active_spin().expect("spin running");
            assert!(plan.total > 0.0);
            run_to_end(&mut w, start);

            let landed = spin.await.expect("landed");
            assert_eq!(w.current_index_under_pointer(), Some(landed));
            assert_eq!(landed, plan.target);
            assert!(w.rotation() >= 0.0 && w.rotation() < TAU);
        }
    }

    #[tokio::test]
    async fn every_index_is_reachable() {
        let mut w = wheel(4);
        let mut seen = [0usize; 3];
        let mut now = Instant::now();
        for _ in 0..1000 {
            w.set_items(["A", "B", "C"]);
            let spin = w.spin(now);
            let duration = w.active_spin().expect("spin running").duration;
            now += duration;
            w.update(now);
            let index = spin.await.expect("landed");
            assert!(index < 3);
            seen[index] += 1;
        }
        for count in seen {
            assert!(count > 250 && count < 420, "skewed distribution {seen:?}");
        }
    }

    #[test]
    fn duration_and_turns_stay_in_range() {
        let mut w = wheel(5);
        w.set_items(["x"; 6]);
        let start = Instant::now();
        for _ in 0..200 {
            let _spin = w.spin(start);
            let plan = w.active_spin().expect("spin running");
            assert!(plan.duration >= Duration::from_millis(3000));
            assert!(plan.duration <= Duration::from_millis(4200));
            assert!(plan.total >= 3.0 * TAU && plan.total < 6.0 * TAU);
            w.update(start + plan.duration);
        }
    }

    #[test]
    fn ticks_fire_once_per_boundary() {
        let mut w = wheel(6);
        w.set_items(["a", "b", "c", "d", "e", "f", "g", "h"]);
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&ticks);
        w.on_tick(move |index| sink.lock().unwrap().push(index));

        let start = Instant::now();
        let from = w.rotation();
        let _spin = w.spin(start);
        let plan = w.active_spin().expect("spin running");
        run_to_end(&mut w, start);

        let slice = slice_angle(8);
        let expected = pointer_slot(from, slice).floor() - pointer_slot(from + plan.total, slice).floor();
        let ticks = ticks.lock().unwrap();
        assert_eq!(ticks.len() as f64, expected);
        for pair in ticks.windows(2) {
            assert_eq!(pair[1], (pair[0] + 7) % 8);
        }
        assert_eq!(ticks.last().copied(), w.current_index_under_pointer());
    }

    #[test]
    fn hooks_fire_around_a_spin() {
        let mut w = wheel(7);
        w.set_items(["A", "B"]);
        let log = Arc::new(Mutex::new(Vec::new()));
        let (start_log, end_log) = (Arc::clone(&log), Arc::clone(&log));
        w.on_start(move || start_log.lock().unwrap().push("start".to_string()));
        w.on_end(move |index| end_log.lock().unwrap().push(format!("end {index}")));

        let start = Instant::now();
        let _spin = w.spin(start);
        run_to_end(&mut w, start);

        let landed = w.current_index_under_pointer().expect("landed");
        assert_eq!(*log.lock().unwrap(), vec!["start".to_string(), format!("end {landed}")]);
    }

    #[test]
    fn highlight_pulses_until_cleared_by_empty_items() {
        let mut w = wheel(8);
        w.set_items(["A", "B", "C"]);
        let start = Instant::now();
        let _spin = w.spin(start);
        let end = run_to_end(&mut w, start);

        let landed = w.current_index_under_pointer();
        assert_eq!(w.highlighted_index(), landed);
        assert!(w.needs_frame());

        w.update(end + Duration::from_millis(700));
        let opacity = w.highlight_opacity().expect("highlighting");
        assert!((opacity - 0.5).abs() < 1e-9);

        w.set_items(Vec::<String>::new());
        assert!(!w.needs_frame());
        assert_eq!(w.highlighted_index(), None);

        let renders = w.surface().renders();
        w.update(end + Duration::from_millis(900));
        assert_eq!(w.surface().renders(), renders);
    }

    #[test]
    fn new_spin_cancels_highlight() {
        let mut w = wheel(9);
        w.set_items(["A", "B", "C"]);
        let start = Instant::now();
        let _first = w.spin(start);
        let end = run_to_end(&mut w, start);
        assert!(w.highlighted_index().is_some());

        let _second = w.spin(end);
        assert_eq!(w.highlighted_index(), None);
    }

    #[test]
    fn clear_highlight_stops_pulse() {
        let mut w = wheel(10);
        w.set_items(["A", "B", "C"]);
        let start = Instant::now();
        let _spin = w.spin(start);
        run_to_end(&mut w, start);
        w.clear_highlight();
        assert!(!w.needs_frame());
    }

    #[test]
    fn shrinking_items_drops_stale_highlight() {
        let mut w = wheel(11);
        w.set_items(["A", "B", "C", "D", "E", "F"]);
        let start = Instant::now();
        let _spin = w.spin(start);
        run_to_end(&mut w, start);
        let landed = w.highlighted_index().expect("highlighting");

        w.set_items(vec!["only"; landed]);
        assert_eq!(w.highlighted_index(), None);
    }

    #[test]
    fn rotation_survives_item_updates() {
        let mut w = wheel(12);
        w.set_items(["A", "B", "C"]);
        let start = Instant::now();
        let _spin = w.spin(start);
        run_to_end(&mut w, start);
        let rotation = w.rotation();
        w.set_items(["D", "E"]);
        assert_eq!(w.rotation(), rotation);
    }

    mockall::mock! {
        Canvas {}
        impl Surface for Canvas {
            fn size(&self) -> f64;
            fn clear(&mut self);
            fn fill_sector(&mut self, sector: Sector, color: Rgba);
            fn stroke_sector(&mut self, sector: Sector, color: Rgba, width: f64);
            fn fill_circle(&mut self, radius: f64, color: Rgba);
            fn measure_text(&self, text: &str, font_size: f64) -> f64;
            fn draw_text(&mut self, text: PlacedText);
        }
    }

    #[test]
    fn rejected_spin_leaves_surface_untouched() {
        let mut canvas = MockCanvas::new();
        canvas.expect_size().return_const(400.0);
        canvas.expect_clear().times(1).return_const(());
        canvas.expect_fill_sector().times(1).return_const(());
        canvas.expect_stroke_sector().times(1).return_const(());
        canvas.expect_fill_circle().times(2).return_const(());
        canvas.expect_draw_text().never();

        let mut w = Wheel::with_rng(canvas, SpinParams::default(), StdRng::seed_from_u64(16));
        let mut spin = w.spin(Instant::now());
        assert_eq!(spin.try_result(), Some(None));
        w.update(Instant::now() + FRAME);
    }

    #[test]
    fn empty_wheel_draws_placeholder_and_hub() {
        let w = wheel(13);
        let commands = w.surface().commands();
        assert_eq!(commands.len(), 4);
        match &commands[0] {
            DrawCommand::FillSector { sector, color } => {
                assert!((sector.end - sector.start - TAU).abs() < 1e-12);
                assert_eq!(*color, PLACEHOLDER_COLOR);
            }
            other => panic!("unexpected first command {other:?}"),
        }
        assert_eq!(
            commands[2],
            DrawCommand::FillCircle {
                radius: HUB_OUTER_RADIUS,
                color: HUB_OUTER_COLOR
            }
        );
        assert_eq!(
            commands[3],
            DrawCommand::FillCircle {
                radius: HUB_INNER_RADIUS,
                color: HUB_INNER_COLOR
            }
        );
    }

    #[test]
    fn slices_are_colored_by_index() {
        let mut w = wheel(14);
        w.set_items(["same", "same", "same", "same", "same", "same"]);
        let fills: Vec<Rgba> = w
            .surface()
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::FillSector { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 6);
        for (i, color) in fills.iter().enumerate() {
            assert_eq!(*color, slice_color(i));
        }
        assert_ne!(fills[0], fills[5]);
    }

    #[test]
    fn labels_are_upright_and_on_the_bisector() {
        let mut w = wheel(15);
        w.set_items(["East", "South", "West", "North"]);
        let radius = 400.0 / 2.0 - RIM;
        for text in w.surface().texts() {
            let distance = (text.x * text.x + text.y * text.y).sqrt();
            assert!((distance - radius * LABEL_RADIUS_RATIO).abs() < 1e-9);
            assert!(!needs_flip(text.angle), "{:?} drawn upside-down", text.lines);
        }
    }
}
