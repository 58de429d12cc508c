use crate::core::contract::{FeatureContract, FeatureKind};
use crate::domain::model::{FeatureValue, ParameterMapping};
use crate::utils::error::{PredictorError, Result};
use std::path::Path;

/// 依契約的特徵型別解析單一字串值
///
/// Categorical fields stay text. Anything else becomes a number when it
/// parses as one and is otherwise passed through as text for the model to judge.
pub fn parse_value(contract: &FeatureContract, name: &str, raw: &str) -> FeatureValue {
    let raw = raw.trim();
    match contract.get(name).map(|spec| &spec.kind) {
        Some(FeatureKind::Categorical) => FeatureValue::Text(raw.to_string()),
        _ => raw
            .parse::<f64>()
            .map(FeatureValue::Number)
            .unwrap_or_else(|_| FeatureValue::Text(raw.to_string())),
    }
}

/// Parses `NAME=VALUE` pairs as given on the command line.
pub fn parse_assignments<S: AsRef<str>>(
    contract: &FeatureContract,
    assignments: &[S],
) -> Result<ParameterMapping> {
    let mut mapping = ParameterMapping::new();
    for assignment in assignments {
        let assignment = assignment.as_ref();
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| PredictorError::InvalidInputError {
                message: format!("expected NAME=VALUE, got '{}'", assignment),
            })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(PredictorError::InvalidInputError {
                message: format!("missing feature name in '{}'", assignment),
            });
        }
        mapping.insert(name.to_string(), parse_value(contract, name, raw));
    }
    Ok(mapping)
}

pub fn mapping_from_json_str(content: &str) -> Result<ParameterMapping> {
    Ok(serde_json::from_str(content)?)
}

pub fn mapping_from_json_file<P: AsRef<Path>>(path: P) -> Result<ParameterMapping> {
    let content = std::fs::read_to_string(path)?;
    mapping_from_json_str(&content)
}

/// Sample steel used by `--sample`: 0.42 C, water quenched, tempered at 500 °C.
pub fn sample_steel() -> ParameterMapping {
    ParameterMapping::from([
        ("C_wt%".to_string(), 0.42.into()),
        ("Mn_wt%".to_string(), 0.75.into()),
        ("Si_wt%".to_string(), 0.18.into()),
        ("Cr_wt%".to_string(), 0.50.into()),
        ("Ni_wt%".to_string(), 0.20.into()),
        ("Mo_wt%".to_string(), 0.10.into()),
        ("Austenitize_Temp_C".to_string(), 900.0.into()),
        ("Hold_Time_min".to_string(), 40.0.into()),
        ("Quench_Medium".to_string(), "Water".into()),
        ("Temper_Temp_C".to_string(), 500.0.into()),
        ("Temper_Time_min".to_string(), 60.0.into()),
        ("Cooling_Rate_Proxy".to_string(), 3.0.into()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_follows_kind() {
        let contract = FeatureContract::steel_hardness();
        assert_eq!(parse_value(&contract, "C_wt%", " 0.42 "), FeatureValue::Number(0.42));
        assert_eq!(
            parse_value(&contract, "Quench_Medium", "Water"),
            FeatureValue::Text("Water".to_string())
        );
        // categorical labels that look numeric stay text
        assert_eq!(
            parse_value(&contract, "Quench_Medium", "1"),
            FeatureValue::Text("1".to_string())
        );
        assert_eq!(
            parse_value(&contract, "Hold_Time_min", "forty"),
            FeatureValue::Text("forty".to_string())
        );
    }

    #[test]
    fn test_parse_assignments() {
        let contract = FeatureContract::steel_hardness();
        let mapping =
            parse_assignments(&contract, &["C_wt%=0.42", "Quench_Medium=Oil", "Note=a=b"]).unwrap();

        assert_eq!(mapping["C_wt%"], FeatureValue::Number(0.42));
        assert_eq!(mapping["Quench_Medium"], FeatureValue::Text("Oil".to_string()));
        assert_eq!(mapping["Note"], FeatureValue::Text("a=b".to_string()));

        assert!(parse_assignments(&contract, &["C_wt%"]).is_err());
        assert!(parse_assignments(&contract, &["=3"]).is_err());
    }

    #[test]
    fn test_sample_steel_satisfies_default_contract() {
        let contract = FeatureContract::steel_hardness();
        assert!(contract.missing_from(&sample_steel()).is_empty());
        assert!(contract.out_of_range(&sample_steel()).is_empty());
    }
}
