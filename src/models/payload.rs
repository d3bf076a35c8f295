use serde::{Deserialize, Serialize};

/// Owned value handed to a callback and returned from it.
///
/// Payloads move: into a queued job when submitted, into the host call when
/// invoked, and back out as part of an [`AsyncResult`](super::AsyncResult).
/// Nothing here is shared between threads, which is what makes the worker
/// hand-off safe without reference counting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Payload {
    /// No data; what a callback receives when the caller had nothing to say.
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Index/measure pair, used by input routing (button + duration,
    /// wheel axis + delta, key + hold time).
    Pair(i64, f64),
    List(Vec<Payload>),
}

impl Payload {
    /// True when there is no data to pass along.
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }
}

impl From<i64> for Payload {
    fn from(v: i64) -> Self {
        Payload::Int(v)
    }
}

impl From<f64> for Payload {
    fn from(v: f64) -> Self {
        Payload::Float(v)
    }
}

impl From<&str> for Payload {
    fn from(v: &str) -> Self {
        Payload::Text(v.to_string())
    }
}

impl From<String> for Payload {
    fn from(v: String) -> Self {
        Payload::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(Payload::default().is_empty());
        assert!(!Payload::Int(0).is_empty());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Payload::from(42i64), Payload::Int(42));
        assert_eq!(Payload::from(1.5f64), Payload::Float(1.5));
        assert_eq!(Payload::from("hi"), Payload::Text("hi".to_string()));
    }

    #[test]
    fn test_yaml_round_trip() {
        let payload = Payload::List(vec![
            Payload::Int(1),
            Payload::Pair(0, 2.5),
            Payload::Text("x".to_string()),
        ]);

        let yaml = serde_yaml_ng::to_string(&payload).unwrap();
        let back: Payload = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, payload);
    }
}
