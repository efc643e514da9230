/// One live WPM reading taken while a session was running
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WpmSample {
    pub t: f64,
    pub wpm: f64,
}

impl WpmSample {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<WpmSample> for (f64, f64) {
    fn from(p: WpmSample) -> Self {
        (p.t, p.wpm)
    }
}

/// Live WPM readings bucketed to whole seconds, used for the results chart.
/// Ticks arrive far more often than once a second; the last reading in a
/// second wins.
#[derive(Debug, Clone, Default)]
pub struct WpmTimeline {
    samples: Vec<WpmSample>,
}

impl WpmTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, elapsed_secs: f64, wpm: f64) {
        if !elapsed_secs.is_finite() || elapsed_secs < 1.0 {
            return;
        }

        let t = elapsed_secs.floor();
        match self.samples.last_mut() {
            Some(last) if last.t == t => last.wpm = wpm,
            Some(last) if last.t > t => {}
            _ => self.samples.push(WpmSample::new(t, wpm)),
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn samples(&self) -> &[WpmSample] {
        &self.samples
    }

    pub fn points(&self) -> Vec<(f64, f64)> {
        self.samples.iter().copied().map(Into::into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_buckets_by_second() {
        let mut timeline = WpmTimeline::new();
        timeline.record(0.4, 90.0);
        timeline.record(1.1, 30.0);
        timeline.record(1.9, 32.0);
        timeline.record(2.0, 40.0);

        assert_eq!(
            timeline.samples(),
            &[WpmSample::new(1.0, 32.0), WpmSample::new(2.0, 40.0)]
        );
    }

    #[test]
    fn test_out_of_order_reading_dropped() {
        let mut timeline = WpmTimeline::new();
        timeline.record(3.0, 50.0);
        timeline.record(2.5, 10.0);
        assert_eq!(timeline.points(), vec![(3.0, 50.0)]);
    }

    #[test]
    fn test_clear() {
        let mut timeline = WpmTimeline::new();
        timeline.record(1.0, 10.0);
        timeline.clear();
        assert!(timeline.samples().is_empty());
    }
}
