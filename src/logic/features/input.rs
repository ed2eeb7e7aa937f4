//! Input Collector - Bounded form fields
//!
//! Every field has a closed domain. Values are checked at the boundary
//! (`set` / `validate`), so the rest of the pipeline never sees out-of-domain
//! input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::vector::InputRecord;
use crate::constants::ACADEMIC_SCORE_PLACEHOLDER;

// ============================================================================
// DOMAINS
// ============================================================================

pub const AGE_RANGE: (u8, u8) = (5, 80);
pub const SCORE_RANGE: (u8, u8) = (0, 10);
pub const SLEEP_HOURS_RANGE: (f64, f64) = (3.0, 12.0);
pub const SCREEN_TIME_RANGE: (f64, f64) = (0.0, 18.0);
pub const HOURS_STEP: f64 = 0.5;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("{field} must be a multiple of {step}, got {value}")]
    OffStep {
        field: &'static str,
        value: f64,
        step: f64,
    },

    #[error("{field} must be one of [{options}], got '{value}'")]
    UnknownCategory {
        field: &'static str,
        value: String,
        options: String,
    },

    #[error("{field} expects a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unknown field '{0}'")]
    UnknownField(String),
}

// ============================================================================
// CATEGORICAL CHOICES
// ============================================================================

/// A closed set of labels shown as a select box
pub trait Choice: Sized + Copy + 'static {
    const FIELD: &'static str;
    const OPTIONS: &'static [Self];

    fn label(self) -> &'static str;

    /// Case-insensitive parse into the canonical option
    fn parse_label(value: &str) -> Result<Self, InputError> {
        let wanted = value.trim();
        Self::OPTIONS
            .iter()
            .copied()
            .find(|option| option.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| InputError::UnknownCategory {
                field: Self::FIELD,
                value: wanted.to_string(),
                options: Self::options_list(),
            })
    }

    fn options_list() -> String {
        Self::OPTIONS
            .iter()
            .map(|o| o.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

macro_rules! choice {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl Choice for $name {
            const FIELD: &'static str = $field;
            const OPTIONS: &'static [Self] = &[$($name::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InputError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse_label(s)
            }
        }
    };
}

choice!(Gender, "Gender" {
    Male => "Male",
    Female => "Female",
    Nonbinary => "Nonbinary",
});

choice!(EducationStage, "EducationStage" {
    Child => "Child",
    Teen => "Teen",
    Undergrad => "Undergrad",
    Adult => "Adult",
});

choice!(Medication, "Medication" {
    No => "No",
    Stimulant => "Stimulant",
    NonStimulant => "Non-stimulant",
});

choice!(SchoolSupport, "SchoolSupport" {
    None => "None",
    Iep => "IEP",
    Section504 => "504",
    Accommodations => "Accommodations",
    Therapy => "Therapy",
});

choice!(
    /// Yes/No select box, recorded as 1/0
    YesNo, "Yes/No" {
        No => "No",
        Yes => "Yes",
    }
);

impl YesNo {
    pub fn as_flag(self) -> i64 {
        match self {
            YesNo::Yes => 1,
            YesNo::No => 0,
        }
    }
}

// ============================================================================
// FORM FIELDS
// ============================================================================

/// Every editable field, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Age,
    Gender,
    EducationStage,
    Inattention,
    Hyperactivity,
    Impulsivity,
    SleepHours,
    ScreenTimeHours,
    Medication,
    SchoolSupport,
    FamilyHistoryAdhd,
    Daydreaming,
    Rsd,
    ComorbidAnxiety,
    ComorbidDepression,
}

impl FormField {
    pub const ALL: &'static [FormField] = &[
        FormField::Age,
        FormField::Gender,
        FormField::EducationStage,
        FormField::Inattention,
        FormField::Hyperactivity,
        FormField::Impulsivity,
        FormField::SleepHours,
        FormField::ScreenTimeHours,
        FormField::Medication,
        FormField::SchoolSupport,
        FormField::FamilyHistoryAdhd,
        FormField::Daydreaming,
        FormField::Rsd,
        FormField::ComorbidAnxiety,
        FormField::ComorbidDepression,
    ];

    /// Column name this field feeds in the input record
    pub fn column(self) -> &'static str {
        match self {
            FormField::Age => "Age",
            FormField::Gender => "Gender",
            FormField::EducationStage => "EducationStage",
            FormField::Inattention => "InattentionScore",
            FormField::Hyperactivity => "HyperactivityScore",
            FormField::Impulsivity => "ImpulsivityScore",
            FormField::SleepHours => "SleepHours",
            FormField::ScreenTimeHours => "ScreenTimeHours",
            FormField::Medication => "Medication",
            FormField::SchoolSupport => "SchoolSupport",
            FormField::FamilyHistoryAdhd => "FamilyHistoryADHD",
            FormField::Daydreaming => "Daydreaming",
            FormField::Rsd => "RSD",
            FormField::ComorbidAnxiety => "ComorbidAnxiety",
            FormField::ComorbidDepression => "ComorbidDepression",
        }
    }

    /// Human-readable domain, shown by the form's `help`
    pub fn domain(self) -> String {
        match self {
            FormField::Age => format!("integer {}-{}", AGE_RANGE.0, AGE_RANGE.1),
            FormField::Inattention | FormField::Hyperactivity | FormField::Impulsivity => {
                format!("integer {}-{}", SCORE_RANGE.0, SCORE_RANGE.1)
            }
            FormField::SleepHours => format!(
                "{:.1}-{:.1} step {}",
                SLEEP_HOURS_RANGE.0, SLEEP_HOURS_RANGE.1, HOURS_STEP
            ),
            FormField::ScreenTimeHours => format!(
                "{:.1}-{:.1} step {}",
                SCREEN_TIME_RANGE.0, SCREEN_TIME_RANGE.1, HOURS_STEP
            ),
            FormField::Gender => Gender::options_list(),
            FormField::EducationStage => EducationStage::options_list(),
            FormField::Medication => Medication::options_list(),
            FormField::SchoolSupport => SchoolSupport::options_list(),
            _ => YesNo::options_list(),
        }
    }

    /// Resolve a field by column name or short alias, case-insensitive
    pub fn lookup(name: &str) -> Result<Self, InputError> {
        let wanted = name.trim();
        let alias = match wanted.to_ascii_lowercase().as_str() {
            "inattention" => Some(FormField::Inattention),
            "hyperactivity" => Some(FormField::Hyperactivity),
            "impulsivity" => Some(FormField::Impulsivity),
            "screentime" => Some(FormField::ScreenTimeHours),
            "sleep" => Some(FormField::SleepHours),
            "familyhistory" => Some(FormField::FamilyHistoryAdhd),
            "anxiety" => Some(FormField::ComorbidAnxiety),
            "depression" => Some(FormField::ComorbidDepression),
            _ => None,
        };

        alias
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|f| f.column().eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| InputError::UnknownField(wanted.to_string()))
    }
}

// ============================================================================
// FORM INPUT
// ============================================================================

/// Current state of the form, one value per field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    pub age: u8,
    pub gender: Gender,
    pub education_stage: EducationStage,
    pub inattention: u8,
    pub hyperactivity: u8,
    pub impulsivity: u8,
    pub sleep_hours: f64,
    pub screen_time_hours: f64,
    pub medication: Medication,
    pub school_support: SchoolSupport,
    pub family_history: YesNo,
    pub daydreaming: YesNo,
    pub rsd: YesNo,
    pub comorbid_anxiety: YesNo,
    pub comorbid_depression: YesNo,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            age: 25,
            gender: Gender::Male,
            education_stage: EducationStage::Child,
            inattention: 3,
            hyperactivity: 3,
            impulsivity: 3,
            sleep_hours: 7.0,
            screen_time_hours: 4.0,
            medication: Medication::No,
            school_support: SchoolSupport::None,
            family_history: YesNo::No,
            daydreaming: YesNo::No,
            rsd: YesNo::No,
            comorbid_anxiety: YesNo::No,
            comorbid_depression: YesNo::No,
        }
    }
}

impl FormInput {
    /// Check every bounded field
    pub fn validate(&self) -> Result<(), InputError> {
        check_int("Age", self.age, AGE_RANGE)?;
        check_int("InattentionScore", self.inattention, SCORE_RANGE)?;
        check_int("HyperactivityScore", self.hyperactivity, SCORE_RANGE)?;
        check_int("ImpulsivityScore", self.impulsivity, SCORE_RANGE)?;
        check_hours("SleepHours", self.sleep_hours, SLEEP_HOURS_RANGE)?;
        check_hours("ScreenTimeHours", self.screen_time_hours, SCREEN_TIME_RANGE)?;
        Ok(())
    }

    /// Parse and apply one edit. The form is unchanged on error.
    pub fn set(&mut self, field: FormField, raw: &str) -> Result<(), InputError> {
        let raw = raw.trim();
        match field {
            FormField::Age => self.age = parse_int(field.column(), raw, AGE_RANGE)?,
            FormField::Inattention => self.inattention = parse_int(field.column(), raw, SCORE_RANGE)?,
            FormField::Hyperactivity => {
                self.hyperactivity = parse_int(field.column(), raw, SCORE_RANGE)?
            }
            FormField::Impulsivity => self.impulsivity = parse_int(field.column(), raw, SCORE_RANGE)?,
            FormField::SleepHours => {
                self.sleep_hours = parse_hours(field.column(), raw, SLEEP_HOURS_RANGE)?
            }
            FormField::ScreenTimeHours => {
                self.screen_time_hours = parse_hours(field.column(), raw, SCREEN_TIME_RANGE)?
            }
            FormField::Gender => self.gender = raw.parse()?,
            FormField::EducationStage => self.education_stage = raw.parse()?,
            FormField::Medication => self.medication = raw.parse()?,
            FormField::SchoolSupport => self.school_support = raw.parse()?,
            FormField::FamilyHistoryAdhd => self.family_history = parse_flag(field.column(), raw)?,
            FormField::Daydreaming => self.daydreaming = parse_flag(field.column(), raw)?,
            FormField::Rsd => self.rsd = parse_flag(field.column(), raw)?,
            FormField::ComorbidAnxiety => self.comorbid_anxiety = parse_flag(field.column(), raw)?,
            FormField::ComorbidDepression => self.comorbid_depression = parse_flag(field.column(), raw)?,
        }
        Ok(())
    }

    /// Current value of a field, formatted for display
    pub fn display_value(&self, field: FormField) -> String {
        match field {
            FormField::Age => self.age.to_string(),
            FormField::Gender => self.gender.to_string(),
            FormField::EducationStage => self.education_stage.to_string(),
            FormField::Inattention => self.inattention.to_string(),
            FormField::Hyperactivity => self.hyperactivity.to_string(),
            FormField::Impulsivity => self.impulsivity.to_string(),
            FormField::SleepHours => format!("{:.1}", self.sleep_hours),
            FormField::ScreenTimeHours => format!("{:.1}", self.screen_time_hours),
            FormField::Medication => self.medication.to_string(),
            FormField::SchoolSupport => self.school_support.to_string(),
            FormField::FamilyHistoryAdhd => self.family_history.to_string(),
            FormField::Daydreaming => self.daydreaming.to_string(),
            FormField::Rsd => self.rsd.to_string(),
            FormField::ComorbidAnxiety => self.comorbid_anxiety.to_string(),
            FormField::ComorbidDepression => self.comorbid_depression.to_string(),
        }
    }

    pub fn symptom_sum(&self) -> i64 {
        i64::from(self.inattention) + i64::from(self.hyperactivity) + i64::from(self.impulsivity)
    }

    /// Map the form onto training column names
    pub fn to_record(&self) -> InputRecord {
        let mut record = InputRecord::new();
        record.insert("Age", i64::from(self.age));
        record.insert("Gender", self.gender.label());
        record.insert("EducationStage", self.education_stage.label());
        record.insert("InattentionScore", i64::from(self.inattention));
        record.insert("HyperactivityScore", i64::from(self.hyperactivity));
        record.insert("ImpulsivityScore", i64::from(self.impulsivity));
        record.insert("SymptomSum", self.symptom_sum());
        record.insert("Daydreaming", self.daydreaming.as_flag());
        record.insert("RSD", self.rsd.as_flag());
        record.insert("SleepHours", self.sleep_hours);
        record.insert("ScreenTimeHours", self.screen_time_hours);
        record.insert("ComorbidAnxiety", self.comorbid_anxiety.as_flag());
        record.insert("ComorbidDepression", self.comorbid_depression.as_flag());
        record.insert("FamilyHistoryADHD", self.family_history.as_flag());
        record.insert("Medication", self.medication.label());
        record.insert("SchoolSupport", self.school_support.label());
        record.insert("AcademicScore", ACADEMIC_SCORE_PLACEHOLDER);
        record
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn check_int(field: &'static str, value: u8, (min, max): (u8, u8)) -> Result<(), InputError> {
    if value < min || value > max {
        return Err(InputError::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

fn check_hours(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), InputError> {
    if !value.is_finite() || value < min || value > max {
        return Err(InputError::OutOfRange {
            field,
            value: value.to_string(),
            min: format!("{:.1}", min),
            max: format!("{:.1}", max),
        });
    }
    // Values on the step grid are exact in binary floating point
    if (value / HOURS_STEP).fract() != 0.0 {
        return Err(InputError::OffStep { field, value, step: HOURS_STEP });
    }
    Ok(())
}

/// Yes/No parse that reports the column instead of the shared choice name
fn parse_flag(field: &'static str, raw: &str) -> Result<YesNo, InputError> {
    raw.parse::<YesNo>().map_err(|err| match err {
        InputError::UnknownCategory { value, options, .. } => {
            InputError::UnknownCategory { field, value, options }
        }
        other => other,
    })
}

fn parse_int(field: &'static str, raw: &str, range: (u8, u8)) -> Result<u8, InputError> {
    let value: i64 = raw.parse().map_err(|_| InputError::InvalidNumber {
        field,
        value: raw.to_string(),
    })?;
    let out_of_range = || InputError::OutOfRange {
        field,
        value: value.to_string(),
        min: range.0.to_string(),
        max: range.1.to_string(),
    };
    let value = u8::try_from(value).map_err(|_| out_of_range())?;
    check_int(field, value, range)?;
    Ok(value)
}

fn parse_hours(field: &'static str, raw: &str, range: (f64, f64)) -> Result<f64, InputError> {
    let value: f64 = raw.parse().map_err(|_| InputError::InvalidNumber {
        field,
        value: raw.to_string(),
    })?;
    check_hours(field, value, range)?;
    Ok(value)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FeatureValue;

    #[test]
    fn test_default_form_is_valid() {
        assert!(FormInput::default().validate().is_ok());
    }

    #[test]
    fn test_age_bounds() {
        let mut form = FormInput::default();
        assert!(form.set(FormField::Age, "5").is_ok());
        assert!(form.set(FormField::Age, "80").is_ok());
        assert_eq!(form.age, 80);

        assert!(matches!(
            form.set(FormField::Age, "4"),
            Err(InputError::OutOfRange { field: "Age", .. })
        ));
        assert!(form.set(FormField::Age, "81").is_err());
        assert!(form.set(FormField::Age, "-3").is_err());
        assert!(form.set(FormField::Age, "300").is_err());
        // Rejected edits leave the form unchanged
        assert_eq!(form.age, 80);
    }

    #[test]
    fn test_hours_step() {
        let mut form = FormInput::default();
        assert!(form.set(FormField::SleepHours, "7.5").is_ok());
        assert!(matches!(
            form.set(FormField::SleepHours, "7.25"),
            Err(InputError::OffStep { .. })
        ));
        assert!(form.set(FormField::SleepHours, "2.5").is_err());
        assert!(form.set(FormField::ScreenTimeHours, "0").is_ok());
        assert!(form.set(FormField::ScreenTimeHours, "18.0").is_ok());
        assert!(form.set(FormField::ScreenTimeHours, "18.5").is_err());
        assert!(form.set(FormField::ScreenTimeHours, "NaN").is_err());
        assert_eq!(form.sleep_hours, 7.5);
    }

    #[test]
    fn test_choice_parse_case_insensitive() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("non-stimulant".parse::<Medication>().unwrap(), Medication::NonStimulant);
        assert_eq!("504".parse::<SchoolSupport>().unwrap(), SchoolSupport::Section504);
        assert_eq!(" yes ".parse::<YesNo>().unwrap(), YesNo::Yes);

        let err = "Robot".parse::<Gender>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Gender must be one of [Male, Female, Nonbinary], got 'Robot'"
        );
    }

    #[test]
    fn test_field_lookup() {
        assert_eq!(FormField::lookup("age").unwrap(), FormField::Age);
        assert_eq!(FormField::lookup("InattentionScore").unwrap(), FormField::Inattention);
        assert_eq!(FormField::lookup("inattention").unwrap(), FormField::Inattention);
        assert_eq!(FormField::lookup("rsd").unwrap(), FormField::Rsd);
        assert!(matches!(
            FormField::lookup("SymptomSum"),
            Err(InputError::UnknownField(_))
        ));
    }

    #[test]
    fn test_symptom_sum() {
        let form = FormInput {
            inattention: 3,
            hyperactivity: 4,
            impulsivity: 2,
            ..Default::default()
        };
        let record = form.to_record();
        assert_eq!(record.get("SymptomSum"), Some(&FeatureValue::Int(9)));
    }

    #[test]
    fn test_record_derived_fields() {
        let form = FormInput {
            rsd: YesNo::Yes,
            medication: Medication::NonStimulant,
            ..Default::default()
        };
        let record = form.to_record();

        assert_eq!(record.len(), 17);
        assert_eq!(record.get("AcademicScore"), Some(&FeatureValue::Float(75.0)));
        assert_eq!(record.get("RSD"), Some(&FeatureValue::Int(1)));
        assert_eq!(record.get("Daydreaming"), Some(&FeatureValue::Int(0)));
        assert_eq!(
            record.get("Medication"),
            Some(&FeatureValue::Category("Non-stimulant".to_string()))
        );
    }

    #[test]
    fn test_every_field_round_trips_display_value() {
        let mut form = FormInput::default();
        for field in FormField::ALL {
            let shown = form.display_value(*field);
            assert!(form.set(*field, &shown).is_ok(), "field {:?}", field);
        }
        assert_eq!(form, FormInput::default());
    }

    #[test]
    fn test_flag_errors_name_the_column() {
        let mut form = FormInput::default();
        let err = form.set(FormField::Rsd, "maybe").unwrap_err();
        assert_eq!(
            err,
            InputError::UnknownCategory {
                field: "RSD",
                value: "maybe".to_string(),
                options: "No, Yes".to_string(),
            }
        );
        assert_eq!(err.to_string(), "RSD must be one of [No, Yes], got 'maybe'");

        let err = form.set(FormField::ComorbidAnxiety, "sometimes").unwrap_err();
        assert!(err.to_string().starts_with("ComorbidAnxiety must be one of"));
        assert_eq!(form.rsd, YesNo::No);
    }
}
