//! Semantic categories of data criteria

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of clinical fact a data criteria describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Definition {
    AdverseEvent,
    AllergyIntolerance,
    Assessment,
    CareGoal,
    CommunicationFromPatientToProvider,
    CommunicationFromProviderToPatient,
    CommunicationFromProviderToProvider,
    Derived,
    DeviceAdverseEvent,
    DeviceAllergy,
    DeviceIntolerance,
    DeviceApplied,
    DeviceOrdered,
    DeviceRecommended,
    Diagnosis,
    DiagnosticStudy,
    Encounter,
    FamilyHistory,
    FunctionalStatus,
    Intervention,
    LaboratoryTest,
    Medication,
    PatientCareExperience,
    PatientCharacteristic,
    PatientCharacteristicAge,
    PatientCharacteristicBirthdate,
    PatientCharacteristicClinicalTrialParticipant,
    PatientCharacteristicEthnicity,
    PatientCharacteristicExpired,
    PatientCharacteristicGender,
    PatientCharacteristicLanguages,
    PatientCharacteristicMaritalStatus,
    PatientCharacteristicPayer,
    PatientCharacteristicRace,
    PatientCharacteristicSex,
    PhysicalExam,
    Preference,
    Procedure,
    ProviderCareExperience,
    ProviderCharacteristic,
    RiskCategoryAssessment,
    SatisfiesAll,
    SatisfiesAny,
    Substance,
    Symptom,
    SystemCharacteristic,
    TransferFrom,
    TransferTo,
    Variable,
}

impl Definition {
    /// Canonical snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Definition::AdverseEvent => "adverse_event",
            Definition::AllergyIntolerance => "allergy_intolerance",
            Definition::Assessment => "assessment",
            Definition::CareGoal => "care_goal",
            Definition::CommunicationFromPatientToProvider => {
                "communication_from_patient_to_provider"
            }
            Definition::CommunicationFromProviderToPatient => {
                "communication_from_provider_to_patient"
            }
            Definition::CommunicationFromProviderToProvider => {
                "communication_from_provider_to_provider"
            }
            Definition::Derived => "derived",
            Definition::DeviceAdverseEvent => "device_adverse_event",
            Definition::DeviceAllergy => "device_allergy",
            Definition::DeviceIntolerance => "device_intolerance",
            Definition::DeviceApplied => "device_applied",
            Definition::DeviceOrdered => "device_ordered",
            Definition::DeviceRecommended => "device_recommended",
            Definition::Diagnosis => "diagnosis",
            Definition::DiagnosticStudy => "diagnostic_study",
            Definition::Encounter => "encounter",
            Definition::FamilyHistory => "family_history",
            Definition::FunctionalStatus => "functional_status",
            Definition::Intervention => "intervention",
            Definition::LaboratoryTest => "laboratory_test",
            Definition::Medication => "medication",
            Definition::PatientCareExperience => "patient_care_experience",
            Definition::PatientCharacteristic => "patient_characteristic",
            Definition::PatientCharacteristicAge => "patient_characteristic_age",
            Definition::PatientCharacteristicBirthdate => "patient_characteristic_birthdate",
            Definition::PatientCharacteristicClinicalTrialParticipant => {
                "patient_characteristic_clinical_trial_participant"
            }
            Definition::PatientCharacteristicEthnicity => "patient_characteristic_ethnicity",
            Definition::PatientCharacteristicExpired => "patient_characteristic_expired",
            Definition::PatientCharacteristicGender => "patient_characteristic_gender",
            Definition::PatientCharacteristicLanguages => "patient_characteristic_languages",
            Definition::PatientCharacteristicMaritalStatus => {
                "patient_characteristic_marital_status"
            }
            Definition::PatientCharacteristicPayer => "patient_characteristic_payer",
            Definition::PatientCharacteristicRace => "patient_characteristic_race",
            Definition::PatientCharacteristicSex => "patient_characteristic_sex",
            Definition::PhysicalExam => "physical_exam",
            Definition::Preference => "preference",
            Definition::Procedure => "procedure",
            Definition::ProviderCareExperience => "provider_care_experience",
            Definition::ProviderCharacteristic => "provider_characteristic",
            Definition::RiskCategoryAssessment => "risk_category_assessment",
            Definition::SatisfiesAll => "satisfies_all",
            Definition::SatisfiesAny => "satisfies_any",
            Definition::Substance => "substance",
            Definition::Symptom => "symptom",
            Definition::SystemCharacteristic => "system_characteristic",
            Definition::TransferFrom => "transfer_from",
            Definition::TransferTo => "transfer_to",
            Definition::Variable => "variable",
        }
    }

    /// Whether this is one of the patient characteristic categories
    pub fn is_patient_characteristic(&self) -> bool {
        self.as_str().starts_with("patient_characteristic")
    }

    /// Whether transfers are modelled as a field rather than a code list
    pub fn is_transfer(&self) -> bool {
        matches!(self, Definition::TransferFrom | Definition::TransferTo)
    }
}

impl FromStr for Definition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| Error::UnknownDefinition(s.to_string()))
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matches_serde() {
        for definition in [
            Definition::CommunicationFromPatientToProvider,
            Definition::PatientCharacteristicClinicalTrialParticipant,
            Definition::LaboratoryTest,
            Definition::TransferTo,
            Definition::Variable,
        ] {
            assert_eq!(definition.as_str().parse::<Definition>().unwrap(), definition);
            assert_eq!(
                serde_json::to_value(definition).unwrap(),
                serde_json::Value::String(definition.as_str().to_string())
            );
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "encounter_performed".parse::<Definition>().unwrap_err();
        assert!(matches!(err, Error::UnknownDefinition(name) if name == "encounter_performed"));
    }

    #[test]
    fn test_patient_characteristic() {
        assert!(Definition::PatientCharacteristicRace.is_patient_characteristic());
        assert!(Definition::PatientCharacteristic.is_patient_characteristic());
        assert!(!Definition::Procedure.is_patient_characteristic());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Definition::LaboratoryTest).unwrap();
        assert_eq!(json, "\"laboratory_test\"");
        let parsed: Definition = serde_json::from_str("\"satisfies_any\"").unwrap();
        assert_eq!(parsed, Definition::SatisfiesAny);
    }
}
