//! A stand-in model: always forecasts partial clouds.
//!
//! Request `data` must be a map and may carry two markers. A truthy `raise`
//! makes the handler fault (the worker dies without answering). A truthy
//! `error` produces an in-band failure: `{ success: false, based_on_input,
//! context }`. Any other shape of `data` is a fault as well.

use portworker_payload::Value;
use portworker_worker::{Handler, HandlerFault, Message};
use tracing::debug;

pub const PREDICTION: &str = "Partial clouds";

/// Handler run by the `portworker` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastPredictor;

impl Handler for ForecastPredictor {
    /// `{ "init_arguments": [<process args>...] }`
    type Context = Value;

    fn init(&self, args: &[String]) -> Result<Value, HandlerFault> {
        let init_arguments: Vec<Value> = args.iter().map(|a| Value::from(a.as_str())).collect();
        Ok(Value::map().with("init_arguments", init_arguments))
    }

    fn predict(&self, message: &Message, context: &Value) -> Result<Value, HandlerFault> {
        if message.data.as_map().is_none() {
            return Err(HandlerFault::new(format!(
                "request data must be a map, got {}",
                message.data.kind()
            )));
        }

        if marker(&message.data, "raise") {
            return Err(HandlerFault::new("foo-bar"));
        }

        if marker(&message.data, "error") {
            debug!(correlation_id = %message.id, "request asked for a failed prediction");
            return Ok(Value::map()
                .with("success", false)
                .with("based_on_input", message.to_value())
                .with("context", context.clone()));
        }

        Ok(Value::map()
            .with("success", true)
            .with("prediction", PREDICTION)
            .with("based_on_input", message.to_value())
            .with("context", context.clone()))
    }
}

fn marker(data: &Value, key: &str) -> bool {
    data.get(key).is_some_and(Value::is_truthy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(args: &[&str]) -> Value {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        ForecastPredictor.init(&args).unwrap()
    }

    #[test]
    fn init_keeps_arguments_in_order() {
        let ctx = context(&["weights.pt", "--gpu"]);
        assert_eq!(
            ctx,
            Value::map().with(
                "init_arguments",
                vec![Value::from("weights.pt"), Value::from("--gpu")]
            )
        );
        assert_eq!(
            context(&[]).get("init_arguments"),
            Some(&Value::Array(Vec::new()))
        );
    }

    #[test]
    fn empty_request_gets_a_forecast() {
        let ctx = context(&[]);
        let message = Message::new([0x01; 16], Value::map());

        let result = ForecastPredictor.predict(&message, &ctx).unwrap();

        let expected = Value::map()
            .with("success", true)
            .with("prediction", "Partial clouds")
            .with(
                "based_on_input",
                Value::map()
                    .with("id", vec![0x01u8; 16])
                    .with("data", Value::map()),
            )
            .with("context", ctx);
        assert_eq!(result, expected);
    }

    #[test]
    fn error_marker_returns_in_band_failure() {
        let ctx = context(&["x"]);
        let data = Value::map().with("error", 1).with("city", "Kraków");
        let message = Message::new([0x02; 16], data);

        let result = ForecastPredictor.predict(&message, &ctx).unwrap();

        assert_eq!(result.get("success"), Some(&Value::Bool(false)));
        assert_eq!(result.get("prediction"), None);
        assert_eq!(result.get("based_on_input"), Some(&message.to_value()));
        assert_eq!(result.get("context"), Some(&ctx));
    }

    #[test]
    fn raise_marker_faults() {
        let message = Message::new([0x03; 16], Value::map().with("raise", true));
        let fault = ForecastPredictor
            .predict(&message, &context(&[]))
            .unwrap_err();
        assert_eq!(fault.reason(), "foo-bar");
    }

    #[test]
    fn raise_wins_over_error() {
        let data = Value::map().with("raise", "yes").with("error", true);
        let message = Message::new([0x04; 16], data);
        assert!(ForecastPredictor.predict(&message, &context(&[])).is_err());
    }

    #[test]
    fn falsy_markers_are_ignored() {
        let data = Value::map()
            .with("raise", false)
            .with("error", Value::Nil)
            .with("other", true);
        let message = Message::new([0x05; 16], data);

        let result = ForecastPredictor.predict(&message, &context(&[])).unwrap();
        assert_eq!(result.get("success"), Some(&Value::Bool(true)));
    }

    #[test]
    fn non_map_data_faults() {
        let shapes = [
            Value::Nil,
            Value::Array(vec![Value::from("raise")]),
            Value::Int(3),
            Value::from("raise"),
        ];
        for data in shapes {
            let kind = data.kind();
            let message = Message::new([0x06; 16], data);
            let fault = ForecastPredictor
                .predict(&message, &context(&[]))
                .unwrap_err();
            assert_eq!(fault.reason(), format!("request data must be a map, got {kind}"));
        }
    }
}
