//! ONNX fixtures for tests
//!
//! Builds small linear regression graphs (`y = x·W + b`) with the model's
//! input layout so the real tract backend can be exercised without a
//! trained artifact on disk.

use crate::models::UsageType;
use crate::predictor::{NUM_FEATURES, NUM_NUMERIC_FEATURES};
use prost::Message;
use tract_onnx::pb;

const ONNX_FLOAT: i32 = 1;
const OPSET_VERSION: i64 = 13;

/// Serialize a linear model with `outputs` columns
///
/// `weights` is row-major `[NUM_FEATURES, outputs]`, `bias` has one entry
/// per output.
pub fn linear_model_bytes(weights: &[f32], bias: &[f32]) -> Vec<u8> {
    let outputs = bias.len();
    assert_eq!(weights.len(), NUM_FEATURES * outputs);

    let graph = pb::GraphProto {
        name: "linear".to_string(),
        node: vec![
            node("MatMul", &["features", "weights"], "scaled"),
            node("Add", &["scaled", "bias"], "log_energy"),
        ],
        initializer: vec![
            float_tensor("weights", &[NUM_FEATURES as i64, outputs as i64], weights),
            float_tensor("bias", &[outputs as i64], bias),
        ],
        input: vec![value_info("features", &[1, NUM_FEATURES as i64])],
        output: vec![value_info("log_energy", &[1, outputs as i64])],
        ..Default::default()
    };

    let model = pb::ModelProto {
        ir_version: 7,
        producer_name: "energisight-tests".to_string(),
        opset_import: vec![pb::OperatorSetIdProto {
            domain: String::new(),
            version: OPSET_VERSION,
            ..Default::default()
        }],
        graph: Some(graph),
        ..Default::default()
    };

    model.encode_to_vec()
}

/// Model predicting `9.5 + 0.1 * floors`, plus 1.0 for hotels
///
/// The five-floor reference office lands exactly on a log prediction of 10.
pub fn reference_model_bytes() -> Vec<u8> {
    let mut weights = vec![0.0f32; NUM_FEATURES];
    weights[2] = 0.1;
    weights[NUM_NUMERIC_FEATURES + UsageType::Hotel.index()] = 1.0;
    linear_model_bytes(&weights, &[9.5])
}

fn node(op_type: &str, inputs: &[&str], output: &str) -> pb::NodeProto {
    pb::NodeProto {
        name: format!("{}_{}", op_type.to_lowercase(), output),
        op_type: op_type.to_string(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: vec![output.to_string()],
        ..Default::default()
    }
}

fn float_tensor(name: &str, dims: &[i64], data: &[f32]) -> pb::TensorProto {
    pb::TensorProto {
        name: name.to_string(),
        dims: dims.to_vec(),
        data_type: ONNX_FLOAT,
        float_data: data.to_vec(),
        ..Default::default()
    }
}

fn value_info(name: &str, dims: &[i64]) -> pb::ValueInfoProto {
    let dim = dims
        .iter()
        .map(|d| pb::tensor_shape_proto::Dimension {
            value: Some(pb::tensor_shape_proto::dimension::Value::DimValue(*d)),
            ..Default::default()
        })
        .collect();

    pb::ValueInfoProto {
        name: name.to_string(),
        r#type: Some(pb::TypeProto {
            value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                elem_type: ONNX_FLOAT,
                shape: Some(pb::TensorShapeProto {
                    dim,
                    ..Default::default()
                }),
                ..Default::default()
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}
