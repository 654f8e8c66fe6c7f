use crate::{
    codec,
    error::Result,
    functions::{Computation, Func},
    value::{ComputeRequest, ComputeResponse, FxIndexMap},
};

/// Runs the computation named `compute_name` over every sensor of `request`.
///
/// Sensors without a single usable reading are left out of the response. Any
/// failure aborts the whole request.
#[tracing::instrument(skip_all, fields(uwid = %request.uwid, compute = compute_name))]
pub fn execute(request: &ComputeRequest, compute_name: &str) -> Result<ComputeResponse> {
    let func = Func::parse(compute_name)?;
    tracing::info!(
        "Executing {compute_name} computation for uwid: {}",
        request.uwid
    );
    let computation = Computation::resolve(func, &request.parameters)?;

    let mut data = FxIndexMap::default();
    for (sensor, series) in &request.data {
        let decoded = codec::decode(series).map_err(|e| e.within(&["data", sensor.as_str()]))?;
        let decoded = match decoded {
            Some(v) => v,
            None => {
                tracing::debug!(sensor = %sensor, "no readings, skipping");
                continue;
            }
        };
        let result = computation.apply(&decoded.series);
        data.insert(
            sensor.clone(),
            codec::encode(&result, Some(decoded.labels.as_slice())),
        );
    }

    tracing::info!("Computation completed for uwid: {}", request.uwid);
    Ok(ComputeResponse {
        data,
        uwid: request.uwid.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComputeError;
    use expect_test::expect;

    fn request(json: &str) -> ComputeRequest {
        serde_json::from_str(json).unwrap()
    }

    fn run(json: &str, compute_name: &str) -> String {
        let response = execute(&request(json), compute_name).unwrap();
        serde_json::to_string(&response).unwrap()
    }

    #[test]
    fn test_execute_rolling_mean() {
        let out = run(
            r#"{
                "data": {"temp": {"1000": 1, "2000": 2, "3000": 3, "4000": 4, "5000": 5}},
                "parameters": {"window_size": 3},
                "tick": 1700000000000,
                "uwid": "abc-123"
            }"#,
            "rolling_mean",
        );
        expect![[r#"{"data":{"temp":{"1000":1.0,"2000":1.5,"3000":2.0,"4000":3.0,"5000":4.0}},"uwid":"abc-123"}"#]]
            .assert_eq(&out);
    }

    #[test]
    fn test_execute_default_window() {
        let out = run(
            r#"{"data": {"s": {"1": 3, "2": 6, "3": 9, "4": 12}}, "tick": 0, "uwid": "u"}"#,
            "rolling_mean",
        );
        expect![[r#"{"data":{"s":{"1":3.0,"2":4.5,"3":6.0,"4":9.0}},"uwid":"u"}"#]]
            .assert_eq(&out);
    }

    #[test]
    fn test_execute_omits_empty_sensors() {
        let out = run(
            r#"{
                "data": {"nulls": {"1000": null, "2000": null}, "empty": {}, "ok": {"1000": 2}},
                "tick": 0,
                "uwid": "u"
            }"#,
            "rolling_mean",
        );
        expect![[r#"{"data":{"ok":{"1000":2.0}},"uwid":"u"}"#]].assert_eq(&out);
    }

    #[test]
    fn test_execute_nulls_are_not_gaps() {
        let out = run(
            r#"{
                "data": {"s": {"1000": 2, "2000": null, "3000": 4}},
                "parameters": {"window_size": 2},
                "tick": 0,
                "uwid": "u"
            }"#,
            "rolling_mean",
        );
        expect![[r#"{"data":{"s":{"1000":2.0,"3000":3.0}},"uwid":"u"}"#]].assert_eq(&out);
    }

    #[test]
    fn test_execute_mixed_formats() {
        let out = run(
            r#"{
                "data": {
                    "epoch": {"1704067200000": 1, "1704067260000": 3},
                    "iso": {"2024-01-01T00:00:00Z": 10, "2024-01-01T00:01:00Z": 30}
                },
                "parameters": {"window_size": 2},
                "tick": 0,
                "uwid": "mixed"
            }"#,
            "rolling_mean",
        );
        expect![[r#"{"data":{"epoch":{"1704067200000":1.0,"1704067260000":2.0},"iso":{"2024-01-01T00:00:00Z":10.0,"2024-01-01T00:01:00Z":20.0}},"uwid":"mixed"}"#]]
            .assert_eq(&out);
    }

    #[test]
    fn test_execute_other_computations() {
        let json = r#"{
            "data": {"s": {"1": 1, "2": 5, "3": 2}},
            "parameters": {"window_size": 2, "alpha": 0.5},
            "tick": 0,
            "uwid": "u"
        }"#;
        expect![[r#"{"data":{"s":{"1":1.0,"2":6.0,"3":7.0}},"uwid":"u"}"#]]
            .assert_eq(&run(json, "rolling_sum"));
        expect![[r#"{"data":{"s":{"1":1.0,"2":1.0,"3":2.0}},"uwid":"u"}"#]]
            .assert_eq(&run(json, "rolling_min"));
        expect![[r#"{"data":{"s":{"1":1.0,"2":5.0,"3":5.0}},"uwid":"u"}"#]]
            .assert_eq(&run(json, "rolling_max"));
        expect![[r#"{"data":{"s":{"1":1.0,"2":3.0,"3":2.5}},"uwid":"u"}"#]]
            .assert_eq(&run(json, "exponential_moving_average"));
    }

    #[test]
    fn test_execute_unknown_computation() {
        let req = request(r#"{"data": {}, "tick": 0, "uwid": "u"}"#);
        match execute(&req, "bogus") {
            Err(ComputeError::UnknownComputation { name }) => assert_eq!(name, "bogus"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_execute_uwid_passthrough() {
        let req = request(r#"{"data": {}, "tick": 42, "uwid": "  weird uwid ✓ "}"#);
        let response = execute(&req, "rolling_mean").unwrap();
        assert_eq!(response.uwid, req.uwid);
        assert!(response.data.is_empty());
    }

    #[test]
    fn test_execute_invalid_label_fails_whole_request() {
        let req = request(
            r#"{"data": {"good": {"1000": 1}, "bad": {"later": 2}}, "tick": 0, "uwid": "u"}"#,
        );
        let err = execute(&req, "rolling_mean").unwrap_err();
        assert!(err.is_client_error());
        expect![[r#"[{"code":"invalid_timestamp","message":"invalid timestamp 'later': expected epoch milliseconds or ISO-8601","path":["data","bad","later"]}]"#]]
            .assert_eq(&serde_json::to_string(&err.issues()).unwrap());
    }

    #[test]
    fn test_execute_invalid_parameter() {
        let req = request(
            r#"{"data": {"s": {"1": 1}}, "parameters": {"window_size": "big"}, "tick": 0, "uwid": "u"}"#,
        );
        let err = execute(&req, "rolling_mean").unwrap_err();
        assert_eq!(err.issues()[0].path, vec!["parameters", "window_size"]);
    }
}
