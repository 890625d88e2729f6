#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

#[test]
fn system_names_match_backend_spelling() {
    assert_eq!(serde_json::to_string(&DynamicalSystem::VanDerPol).unwrap(), "\"VanDerPol\"");
    for system in DynamicalSystem::ALL {
        let json = serde_json::to_string(&system).unwrap();
        assert_eq!(json, format!("\"{}\"", system.as_str()));
    }
}

#[test]
fn system_from_str_is_case_insensitive() {
    assert_eq!("lorenzsystem".parse::<DynamicalSystem>().unwrap(), DynamicalSystem::LorenzSystem);
    assert_eq!("Pendulum".parse::<DynamicalSystem>().unwrap(), DynamicalSystem::Pendulum);
    assert!("Duffing".parse::<DynamicalSystem>().is_err());
}

#[test]
fn plot_request_wire_shape() {
    let request = PlotRequest::new("dataset_1", DynamicalSystem::VanDerPol, 500).unwrap();
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"id": "dataset_1", "system": "VanDerPol", "numSimulations": 500})
    );
}

#[test]
fn plot_request_rejects_zero_simulations() {
    let err = PlotRequest::new("d", DynamicalSystem::Pendulum, 0).unwrap_err();
    assert!(matches!(err, SyncError::InvalidRequest(_)));
}

#[test]
fn parse_two_column_trajectory() {
    let body = json!({
        "System_name": "VanDerPol",
        "Num_simulations": 3,
        "Y_data": {"Y": [[0.0, 1.0], [0.5, 0.75], [1.0, 0.25]]},
        "nx": 2
    })
    .to_string();
    let series = parse_plot_response(&body).unwrap();
    assert_eq!(series.points, [(0.0, 1.0), (0.5, 0.75), (1.0, 0.25)]);
    assert_eq!(series.nx, Some(2));
}

#[test]
fn parse_keeps_first_two_columns_of_wider_rows() {
    let body = json!({"Y_data": {"Y": [[1.0, 2.0, 3.0]]}}).to_string();
    let series = parse_plot_response(&body).unwrap();
    assert_eq!(series.points, [(1.0, 2.0)]);
    assert_eq!(series.nx, None);
}

#[test]
fn parse_rejects_short_rows() {
    let body = json!({"Y_data": {"Y": [[1.0, 2.0], [3.0]]}}).to_string();
    let err = parse_plot_response(&body).unwrap_err();
    assert!(matches!(err, SyncError::InvalidResponse(ref msg) if msg.contains("row 1")));
}

#[test]
fn parse_rejects_missing_y_data() {
    let err = parse_plot_response(r#"{"error": "Request must contain JSON data"}"#).unwrap_err();
    assert!(matches!(err, SyncError::InvalidResponse(_)));
}

#[test]
fn parse_rejects_non_json() {
    assert!(matches!(parse_plot_response("<html>"), Err(SyncError::InvalidResponse(_))));
}
