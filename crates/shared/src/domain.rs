use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::EditError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lifestyle {
    #[default]
    Sedentary,
    Moderate,
    Active,
}

impl Lifestyle {
    pub const ALL: [Lifestyle; 3] = [Self::Sedentary, Self::Moderate, Self::Active];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sedentary => "Sedentary",
            Self::Moderate => "Moderate",
            Self::Active => "Active",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Sedentary => "Sedentary (Low Activity)",
            Self::Moderate => "Moderate (Active 2-3x/week)",
            Self::Active => "Athletic (Daily Training)",
        }
    }
}

impl fmt::Display for Lifestyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lifestyle {
    type Err = EditError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sedentary" => Ok(Self::Sedentary),
            "moderate" => Ok(Self::Moderate),
            "active" | "athletic" => Ok(Self::Active),
            _ => Err(EditError::UnknownLifestyle(value.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Age,
    Bmi,
    SystolicBp,
    FastingGlucose,
    Lifestyle,
}

impl ProfileField {
    pub const ALL: [ProfileField; 5] = [
        Self::Age,
        Self::Bmi,
        Self::SystolicBp,
        Self::FastingGlucose,
        Self::Lifestyle,
    ];

    /// Key used for this field in the analysis request body.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Bmi => "bmi",
            Self::SystolicBp => "bp",
            Self::FastingGlucose => "sugar",
            Self::Lifestyle => "lifestyle",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Biological Age",
            Self::Bmi => "BMI Index",
            Self::SystolicBp => "Systolic Pressure (mmHg)",
            Self::FastingGlucose => "Fasting Glucose (mg/dL)",
            Self::Lifestyle => "Lifestyle Factor",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ProfileField {
    type Err = EditError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "age" => Ok(Self::Age),
            "bmi" => Ok(Self::Bmi),
            "bp" | "systolic_bp" | "systolicbp" | "blood_pressure" => Ok(Self::SystolicBp),
            "sugar" | "fasting_glucose" | "fastingglucose" | "glucose" => Ok(Self::FastingGlucose),
            "lifestyle" => Ok(Self::Lifestyle),
            _ => Err(EditError::UnknownField(name.trim().to_string())),
        }
    }
}

/// Editable input form state. Numeric fields are kept as the raw text the
/// user typed; the empty string means "unset".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BiometricProfile {
    pub age: String,
    pub bmi: String,
    pub systolic_bp: String,
    pub fasting_glucose: String,
    pub lifestyle: Lifestyle,
}

impl BiometricProfile {
    /// Profile reported by the simulated wearable.
    pub fn canonical_wearable() -> Self {
        Self {
            age: "45".to_string(),
            bmi: "28.5".to_string(),
            systolic_bp: "135".to_string(),
            fasting_glucose: "110".to_string(),
            lifestyle: Lifestyle::Moderate,
        }
    }

    pub fn value(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Age => &self.age,
            ProfileField::Bmi => &self.bmi,
            ProfileField::SystolicBp => &self.systolic_bp,
            ProfileField::FastingGlucose => &self.fasting_glucose,
            ProfileField::Lifestyle => self.lifestyle.as_str(),
        }
    }

    /// Returns a copy with one field replaced. Numeric fields accept any
    /// text; only `lifestyle` is checked, since it has no free-form state.
    pub fn with_field(&self, field: ProfileField, value: &str) -> Result<Self, EditError> {
        let mut next = self.clone();
        match field {
            ProfileField::Age => next.age = value.to_string(),
            ProfileField::Bmi => next.bmi = value.to_string(),
            ProfileField::SystolicBp => next.systolic_bp = value.to_string(),
            ProfileField::FastingGlucose => next.fasting_glucose = value.to_string(),
            ProfileField::Lifestyle => next.lifestyle = value.parse()?,
        }
        Ok(next)
    }

    /// Submission gate: age must be present and not zero.
    pub fn has_age(&self) -> bool {
        if self.age.trim().is_empty() {
            return false;
        }
        coerce_number(&self.age) != 0.0
    }
}

/// Text-to-number coercion applied at submission time. Empty or non-numeric
/// input yields NaN, which is passed through to the service untouched.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
