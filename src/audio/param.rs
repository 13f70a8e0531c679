//! Parameter automation timelines.
//!
//! An [`AutomationParam`] models a value that changes over the life of a
//! sound: a filter cutoff, an oscillator frequency, or a gain. Events are
//! scheduled up front and the renderer samples the timeline once per
//! output sample.

use crate::error::AudioError;

/// A single scheduled change.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AutomationEvent {
    /// Jump to `value` at `time`.
    Set { value: f32, time: f64 },
    /// Ramp exponentially from the previous event to `value`, arriving at `time`.
    ExponentialRamp { value: f32, time: f64 },
}

impl AutomationEvent {
    fn time(&self) -> f64 {
        match *self {
            AutomationEvent::Set { time, .. } | AutomationEvent::ExponentialRamp { time, .. } => {
                time
            }
        }
    }

    fn value(&self) -> f32 {
        match *self {
            AutomationEvent::Set { value, .. }
            | AutomationEvent::ExponentialRamp { value, .. } => value,
        }
    }
}

/// A value automated over time, in seconds from the start of the sound.
///
/// Before the first event the default value holds. After the last event
/// the last value holds.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationParam {
    default_value: f32,
    events: Vec<AutomationEvent>,
}

impl AutomationParam {
    /// Creates a timeline that holds `default_value` until told otherwise.
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            events: Vec::new(),
        }
    }

    /// Holds `value` from `time` onward.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::RampOutOfOrder`] if `time` precedes the last
    /// scheduled event.
    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> Result<&mut Self, AudioError> {
        self.check_order(time)?;
        self.events.push(AutomationEvent::Set { value, time });
        Ok(self)
    }

    /// Ramps exponentially from the previous event's value to `value`,
    /// arriving at `time`.
    ///
    /// Exponential interpolation is undefined toward or away from zero, so
    /// both the target and the value being ramped from must be strictly
    /// positive. Use a small floor such as `0.0001` for "silent".
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::NonPositiveRamp`] for a non-positive endpoint
    /// and [`AudioError::RampOutOfOrder`] if `time` precedes the last event.
    pub fn exponential_ramp_to_value_at_time(
        &mut self,
        value: f32,
        time: f64,
    ) -> Result<&mut Self, AudioError> {
        if value <= 0.0 || !value.is_finite() {
            return Err(AudioError::NonPositiveRamp { value });
        }
        let start = self.last_value();
        if start <= 0.0 {
            return Err(AudioError::NonPositiveRamp { value: start });
        }
        self.check_order(time)?;
        self.events
            .push(AutomationEvent::ExponentialRamp { value, time });
        Ok(self)
    }

    /// Returns the value of the timeline at `time` seconds.
    pub fn value_at(&self, time: f64) -> f32 {
        let mut value = self.default_value;
        let mut prev_time = 0.0;

        for event in &self.events {
            match *event {
                AutomationEvent::Set { value: v, time: t } => {
                    if time < t {
                        return value;
                    }
                    value = v;
                    prev_time = t;
                }
                AutomationEvent::ExponentialRamp { value: v, time: t } => {
                    if time < t {
                        let span = t - prev_time;
                        if span <= 0.0 {
                            return v;
                        }
                        let progress = ((time - prev_time) / span).clamp(0.0, 1.0);
                        let ratio = (v / value) as f64;
                        return (value as f64 * ratio.powf(progress)) as f32;
                    }
                    value = v;
                    prev_time = t;
                }
            }
        }

        value
    }

    /// Returns the time of the last scheduled event, or zero.
    pub fn end_time(&self) -> f64 {
        self.events.last().map(AutomationEvent::time).unwrap_or(0.0)
    }

    fn last_value(&self) -> f32 {
        self.events
            .last()
            .map(AutomationEvent::value)
            .unwrap_or(self.default_value)
    }

    fn check_order(&self, time: f64) -> Result<(), AudioError> {
        let previous = self.end_time();
        if time < previous {
            return Err(AudioError::RampOutOfOrder { time, previous });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_value_before_events() {
        let mut param = AutomationParam::new(0.5);
        param.set_value_at_time(1.0, 0.1).unwrap();
        assert_eq!(param.value_at(0.0), 0.5);
        assert_eq!(param.value_at(0.1), 1.0);
        assert_eq!(param.value_at(5.0), 1.0);
    }

    #[test]
    fn test_exponential_ramp_midpoint_is_geometric_mean() {
        let mut param = AutomationParam::new(1.0);
        param
            .set_value_at_time(100.0, 0.0)
            .unwrap()
            .exponential_ramp_to_value_at_time(400.0, 1.0)
            .unwrap();

        assert_relative_eq!(param.value_at(0.0), 100.0, epsilon = 1e-3);
        assert_relative_eq!(param.value_at(0.5), 200.0, epsilon = 1e-2);
        assert_relative_eq!(param.value_at(1.0), 400.0, epsilon = 1e-3);
        assert_relative_eq!(param.value_at(2.0), 400.0, epsilon = 1e-3);
    }

    #[test]
    fn test_chained_ramps_rise_then_fall() {
        let mut param = AutomationParam::new(1.0);
        param
            .set_value_at_time(0.0001, 0.0)
            .unwrap()
            .exponential_ramp_to_value_at_time(1.0, 0.06)
            .unwrap()
            .exponential_ramp_to_value_at_time(0.0001, 0.32)
            .unwrap();

        assert!(param.value_at(0.0) < 0.001);
        assert_relative_eq!(param.value_at(0.06), 1.0, epsilon = 1e-4);
        assert!(param.value_at(0.03) < param.value_at(0.05));
        assert!(param.value_at(0.2) > param.value_at(0.3));
        assert!(param.value_at(0.32) < 0.001);
    }

    #[test]
    fn test_ramp_to_zero_is_rejected() {
        let mut param = AutomationParam::new(1.0);
        let err = param.exponential_ramp_to_value_at_time(0.0, 0.1).unwrap_err();
        assert!(matches!(err, AudioError::NonPositiveRamp { .. }));
    }

    #[test]
    fn test_ramp_from_zero_is_rejected() {
        let mut param = AutomationParam::new(1.0);
        param.set_value_at_time(0.0, 0.0).unwrap();
        let err = param.exponential_ramp_to_value_at_time(1.0, 0.1).unwrap_err();
        assert!(matches!(err, AudioError::NonPositiveRamp { value } if value == 0.0));
    }

    #[test]
    fn test_out_of_order_event_is_rejected() {
        let mut param = AutomationParam::new(1.0);
        param.set_value_at_time(1.0, 0.5).unwrap();
        let err = param.set_value_at_time(2.0, 0.2).unwrap_err();
        assert!(matches!(err, AudioError::RampOutOfOrder { .. }));
    }
}
