//! Step queue and the timed hop animation of the avatar.

use std::{collections::VecDeque, f32::consts::PI, time::Duration};

use crossing_core::{Direction, GridPosition, MotionTuning};

/// Fixed-duration curve mapping elapsed step time to travel and hop height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepCurve {
    duration: Duration,
    cell_width: f32,
    hop_amplitude: f32,
    hop_exponent: f32,
}

impl StepCurve {
    /// Creates a curve from motion tuning and the board's cell width.
    #[must_use]
    pub fn new(motion: &MotionTuning, cell_width: f32) -> Self {
        Self {
            duration: motion.step_duration(),
            cell_width,
            hop_amplitude: motion.hop_amplitude,
            hop_exponent: motion.hop_exponent,
        }
    }

    /// Duration of a single step.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Linear progress through the step, clamped to `[0, 1]`.
    #[must_use]
    pub fn fraction(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Distance travelled along the step axis, reaching one cell width at the end.
    #[must_use]
    pub fn travel(&self, elapsed: Duration) -> f32 {
        self.fraction(elapsed) * self.cell_width
    }

    /// Hop elevation: a fast rise followed by a slow fall back to the ground.
    #[must_use]
    pub fn hop(&self, elapsed: Duration) -> f32 {
        let fraction = self.fraction(elapsed);
        let height = (PI * fraction.powf(self.hop_exponent)).sin() * self.hop_amplitude;
        height.max(0.0)
    }
}

/// FIFO of accepted moves; the head is the step in flight.
#[derive(Clone, Debug, Default)]
pub(crate) struct MoveQueue {
    moves: VecDeque<Direction>,
    started_at: Option<Duration>,
}

impl MoveQueue {
    pub(crate) fn len(&self) -> usize {
        self.moves.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Direction and start time of the step currently animating.
    pub(crate) fn in_flight(&self) -> Option<(Direction, Duration)> {
        Some((*self.moves.front()?, self.started_at?))
    }

    /// Position the avatar reaches once every queued move completes.
    ///
    /// Returns `None` when a queued move would leave the board, which cannot
    /// happen for moves that passed validation.
    pub(crate) fn tentative(&self, settled: GridPosition, columns: u32) -> Option<GridPosition> {
        self.moves
            .iter()
            .try_fold(settled, |position, direction| direction.step_from(position, columns))
    }

    /// Queues an accepted move, starting its clock when nothing was animating.
    pub(crate) fn push(&mut self, direction: Direction, now: Duration) {
        if self.moves.is_empty() {
            self.started_at = Some(now);
        }
        self.moves.push_back(direction);
    }

    /// Completes the head step if its clock has run for `duration`.
    ///
    /// The following step, if any, starts at `now` so queued moves chain with
    /// no gap and no drift.
    pub(crate) fn complete_due(&mut self, now: Duration, duration: Duration) -> Option<Direction> {
        let (direction, started_at) = self.in_flight()?;
        if now.saturating_sub(started_at) < duration {
            return None;
        }
        let _ = self.moves.pop_front();
        self.started_at = (!self.moves.is_empty()).then_some(now);
        Some(direction)
    }

    /// Drops every queued move and stops the step clock.
    pub(crate) fn clear(&mut self) {
        self.moves.clear();
        self.started_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> StepCurve {
        StepCurve::new(&MotionTuning::default(), 84.0)
    }

    #[test]
    fn travel_spans_exactly_one_cell() {
        let curve = curve();
        assert_eq!(curve.travel(Duration::ZERO), 0.0);
        assert_eq!(curve.travel(curve.duration()), 84.0);
        assert_eq!(curve.travel(Duration::from_secs(5)), 84.0);
        assert!((curve.travel(Duration::from_millis(100)) - 42.0).abs() < 1e-3);
    }

    #[test]
    fn hop_rises_fast_and_lands() {
        let curve = curve();
        assert_eq!(curve.hop(Duration::ZERO), 0.0);
        assert!(curve.hop(curve.duration()) < 1e-3);

        let early = curve.hop(Duration::from_millis(2));
        let late = curve.hop(Duration::from_millis(180));
        assert!(early > late, "early {early} late {late}");
        assert!(early <= 16.0);
    }

    #[test]
    fn queue_completes_heads_in_order() {
        let mut queue = MoveQueue::default();
        let step = Duration::from_millis(200);
        queue.push(Direction::Forward, Duration::ZERO);
        queue.push(Direction::Left, Duration::from_millis(50));

        assert_eq!(queue.complete_due(Duration::from_millis(199), step), None);
        assert_eq!(
            queue.complete_due(Duration::from_millis(216), step),
            Some(Direction::Forward)
        );
        assert_eq!(
            queue.in_flight(),
            Some((Direction::Left, Duration::from_millis(216)))
        );
        assert_eq!(
            queue.complete_due(Duration::from_millis(416), step),
            Some(Direction::Left)
        );
        assert!(queue.is_empty());
        assert_eq!(queue.in_flight(), None);
    }

    #[test]
    fn tentative_folds_every_queued_move() {
        let mut queue = MoveQueue::default();
        queue.push(Direction::Forward, Duration::ZERO);
        queue.push(Direction::Right, Duration::ZERO);
        assert_eq!(
            queue.tentative(GridPosition::new(0, 8), 17),
            Some(GridPosition::new(1, 9))
        );

        queue.clear();
        assert_eq!(queue.len(), 0);
        assert_eq!(
            queue.tentative(GridPosition::new(0, 8), 17),
            Some(GridPosition::new(0, 8))
        );
    }
}
