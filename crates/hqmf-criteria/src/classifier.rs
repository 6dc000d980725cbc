//! Template classification and the definition-element fallback

use crate::{
    extractor::criteria_element,
    models::{DataCriteria, Definition, DerivationOperator, GROUP_PREFIX},
    registry::{CriteriaRegistry, TemplateRegistry},
    tokens,
    xml::Element,
    Error, Result,
};
use tracing::{debug, warn};

/// Marks an entry as a QDM variable
pub const VARIABLE_TEMPLATE: &str = "0.1.2.3.4.5.6.7.8.9.1";
pub const SATISFIES_ANY_TEMPLATE: &str = "2.16.840.1.113883.10.20.28.3.108";
pub const SATISFIES_ALL_TEMPLATE: &str = "2.16.840.1.113883.10.20.28.3.109";

/// Classifies an entry by its template ids
pub struct TemplateClassifier<'a> {
    templates: &'a TemplateRegistry,
}

impl<'a> TemplateClassifier<'a> {
    pub fn new(templates: &'a TemplateRegistry) -> Self {
        Self { templates }
    }

    /// Apply the template ids of `criteria`; returns whether any was recognized
    ///
    /// The first registry hit sets definition and status; later hits are
    /// ignored. The sentinel templates apply regardless of registry hits, and
    /// satisfies-any ends classification immediately.
    pub fn classify(&self, criteria: &mut DataCriteria) -> bool {
        let mut found = false;
        let mut registry_hit = false;

        for template_id in criteria.template_ids.clone() {
            match template_id.as_str() {
                VARIABLE_TEMPLATE => {
                    if criteria.derivation_operator == Some(DerivationOperator::XProduct) {
                        criteria.derivation_operator = Some(DerivationOperator::Intersect);
                    }
                    criteria.definition = Some(Definition::Derived);
                    criteria.negation = false;
                    criteria.variable = true;
                    found = true;
                }
                SATISFIES_ANY_TEMPLATE => {
                    criteria.definition = Some(Definition::SatisfiesAny);
                    criteria.negation = false;
                    return true;
                }
                SATISFIES_ALL_TEMPLATE => {
                    criteria.definition = Some(Definition::SatisfiesAll);
                    criteria.derivation_operator = Some(DerivationOperator::Intersect);
                    criteria.negation = false;
                    found = true;
                }
                _ if registry_hit => {}
                id => {
                    if let Some(known) = self.templates.lookup(id) {
                        debug!("Template {} classifies {} as {}", id, criteria.id, known.definition);
                        criteria.definition = Some(known.definition);
                        criteria.status = known.status().map(str::to_string);
                        registry_hit = true;
                        found = true;
                    }
                }
            }
        }

        found
    }
}

/// Classification from the definition element, used when no template matched
pub struct DefinitionFallback;

impl DefinitionFallback {
    pub fn classify(
        entry: &Element,
        criteria: &mut DataCriteria,
        references: &CriteriaRegistry,
    ) -> Result<()> {
        let reference_id = Self::first_reference(entry)?;

        if criteria.variable && criteria.specific_occurrence.is_some() {
            Self::copy_variable_reference(criteria, reference_id.as_deref(), references);
        }

        if entry.child("grouperCriteria").is_some() {
            criteria.definition.get_or_insert(Definition::Derived);
            return Ok(());
        }

        let Some(entry_type) = entry.value_at("./*/cda:definition/*/cda:id/@extension")? else {
            return Self::copy_reference(criteria, reference_id.as_deref(), references);
        };

        if let Ok(definition) = entry_type.parse::<Definition>() {
            criteria.definition = Some(definition);
            return Ok(());
        }

        let definition = match entry_type {
            "Problem" | "Problems" => Definition::Diagnosis,
            "Encounter" | "Encounters" => Definition::Encounter,
            "LabResults" | "Results" => Definition::LaboratoryTest,
            "Procedure" | "Procedures" => Definition::Procedure,
            "Medication" | "Medications" => {
                criteria.status.get_or_insert_with(|| "active".to_string());
                Definition::Medication
            }
            "RX" => {
                criteria.status.get_or_insert_with(|| "dispensed".to_string());
                Definition::Medication
            }
            "Demographics" => Self::demographic(entry)?,
            "Derived" => Definition::Derived,
            other => return Err(Error::UnknownDefinition(other.to_string())),
        };
        criteria.definition = Some(definition);
        Ok(())
    }

    fn first_reference(entry: &Element) -> Result<Option<String>> {
        Ok(entry
            .select_first("./*/cda:outboundRelationship/cda:criteriaReference/cda:id")?
            .map(|id| tokens::reference_id(id.attr("extension"), id.attr("root"))))
    }

    /// A specific occurrence of a variable takes its composition from the variable
    fn copy_variable_reference(
        criteria: &mut DataCriteria,
        reference_id: Option<&str>,
        references: &CriteriaRegistry,
    ) {
        let Some(reference_id) = reference_id else {
            return;
        };
        let mut reference = references.get(reference_id);
        if reference.is_some_and(DataCriteria::is_derived) {
            reference = references.get(&format!("{GROUP_PREFIX}{reference_id}"));
        }
        let Some(reference) = reference else {
            return;
        };

        if reference.children_criteria.is_empty() {
            // variable standing for a single criteria
            criteria.children_criteria = vec![reference.id.clone()];
        } else {
            criteria.field_values = reference.field_values.clone();
            criteria.temporal_references = reference.temporal_references.clone();
            criteria.subset_operators = reference.subset_operators.clone();
            criteria.derivation_operator = reference.derivation_operator;
            criteria.definition = reference.definition;
            criteria.description = reference.description.clone();
            criteria.status = reference.status.clone();
            criteria.children_criteria = reference.children_criteria.clone();
        }
    }

    fn copy_reference(
        criteria: &mut DataCriteria,
        reference_id: Option<&str>,
        references: &CriteriaRegistry,
    ) -> Result<()> {
        match reference_id.and_then(|id| references.get(id)) {
            Some(reference) => {
                criteria.definition = reference.definition;
                criteria.status = reference.status.clone();
                if criteria.specific_occurrence.is_some() {
                    criteria.title = Some(reference.title());
                    criteria.description = reference.description.clone();
                    criteria.code_list_id = reference.code_list_id();
                }
            }
            None => {
                if !criteria.variable {
                    warn!(
                        "Unresolved criteria reference {:?} from {}, treating as variable",
                        reference_id, criteria.id
                    );
                }
                criteria.definition = Some(Definition::Variable);
            }
        }
        Ok(())
    }

    fn demographic(entry: &Element) -> Result<Definition> {
        let code = entry
            .value_at("./cda:observationCriteria/cda:code/@code")?
            .unwrap_or_default();
        match code {
            "21112-8" => Ok(Definition::PatientCharacteristicBirthdate),
            "424144002" => Ok(Definition::PatientCharacteristicAge),
            "263495000" => Ok(Definition::PatientCharacteristicGender),
            "102902016" => Ok(Definition::PatientCharacteristicLanguages),
            "125680007" => Ok(Definition::PatientCharacteristicMaritalStatus),
            "103579009" => Ok(Definition::PatientCharacteristicRace),
            other => Err(Error::UnknownDemographic(other.to_string())),
        }
    }
}

/// Value set of the first related criteria, used for transfers without a code list
pub fn related_value_set(entry: &Element) -> Option<String> {
    let criteria = criteria_element(entry)?;
    criteria
        .children_named("outboundRelationship")
        .filter_map(|relationship| {
            relationship
                .children()
                .find(|child| child.name().ends_with("Criteria"))
        })
        .filter_map(|related| related.child("value"))
        .find_map(|value| value.attr("valueSet"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TemplateDefinition;

    fn templates() -> TemplateRegistry {
        let mut templates = TemplateRegistry::new();
        templates.insert(
            "1.1",
            TemplateDefinition {
                definition: Definition::Encounter,
                status: "performed".to_string(),
            },
        );
        templates.insert(
            "1.2",
            TemplateDefinition {
                definition: Definition::Diagnosis,
                status: String::new(),
            },
        );
        templates
    }

    fn with_templates(ids: &[&str]) -> DataCriteria {
        let mut criteria = DataCriteria::new("c");
        criteria.template_ids = ids.iter().map(|s| s.to_string()).collect();
        criteria
    }

    #[test]
    fn test_first_registry_hit_wins() {
        let templates = templates();
        let mut criteria = with_templates(&["9.9", "1.1", "1.2"]);
        assert!(TemplateClassifier::new(&templates).classify(&mut criteria));
        assert_eq!(criteria.definition, Some(Definition::Encounter));
        assert_eq!(criteria.status.as_deref(), Some("performed"));
    }

    #[test]
    fn test_unknown_templates_not_found() {
        let templates = templates();
        let mut criteria = with_templates(&["9.9"]);
        assert!(!TemplateClassifier::new(&templates).classify(&mut criteria));
        assert!(criteria.definition.is_none());
    }

    #[test]
    fn test_variable_sentinel() {
        let templates = templates();
        let mut criteria = with_templates(&["1.2", VARIABLE_TEMPLATE]);
        criteria.negation = true;
        criteria.derivation_operator = Some(DerivationOperator::XProduct);

        assert!(TemplateClassifier::new(&templates).classify(&mut criteria));
        assert_eq!(criteria.definition, Some(Definition::Derived));
        assert_eq!(criteria.derivation_operator, Some(DerivationOperator::Intersect));
        assert!(criteria.variable);
        assert!(!criteria.negation);
    }

    #[test]
    fn test_satisfies_any_stops_classification() {
        let templates = templates();
        let mut criteria = with_templates(&[SATISFIES_ANY_TEMPLATE, "1.1"]);
        assert!(TemplateClassifier::new(&templates).classify(&mut criteria));
        assert_eq!(criteria.definition, Some(Definition::SatisfiesAny));
        assert!(criteria.status.is_none());
    }

    #[test]
    fn test_satisfies_all_forces_intersect() {
        let templates = templates();
        let mut criteria = with_templates(&[SATISFIES_ALL_TEMPLATE]);
        criteria.derivation_operator = Some(DerivationOperator::Union);
        assert!(TemplateClassifier::new(&templates).classify(&mut criteria));
        assert_eq!(criteria.definition, Some(Definition::SatisfiesAll));
        assert_eq!(criteria.derivation_operator, Some(DerivationOperator::Intersect));
    }

    fn entry_with_definition(definition: &str, code: &str) -> Element {
        Element::parse(&format!(
            r#"<entry><observationCriteria>
                 <code code="{code}"/>
                 <definition><observationReference><id root="1" extension="{definition}"/></observationReference></definition>
               </observationCriteria></entry>"#
        ))
        .unwrap()
    }

    #[test]
    fn test_definition_table() {
        let references = CriteriaRegistry::new();
        let cases = [
            ("Problems", Definition::Diagnosis, None),
            ("LabResults", Definition::LaboratoryTest, None),
            ("Medication", Definition::Medication, Some("active")),
            ("RX", Definition::Medication, Some("dispensed")),
            ("Derived", Definition::Derived, None),
            ("physical_exam", Definition::PhysicalExam, None),
        ];
        for (value, definition, status) in cases {
            let mut criteria = DataCriteria::new("c");
            DefinitionFallback::classify(&entry_with_definition(value, ""), &mut criteria, &references)
                .unwrap();
            assert_eq!(criteria.definition, Some(definition), "{value}");
            assert_eq!(criteria.status.as_deref(), status, "{value}");
        }
    }

    #[test]
    fn test_demographics() {
        let references = CriteriaRegistry::new();
        let mut criteria = DataCriteria::new("c");
        DefinitionFallback::classify(
            &entry_with_definition("Demographics", "21112-8"),
            &mut criteria,
            &references,
        )
        .unwrap();
        assert_eq!(criteria.definition, Some(Definition::PatientCharacteristicBirthdate));

        let err = DefinitionFallback::classify(
            &entry_with_definition("Demographics", "0000"),
            &mut DataCriteria::new("c"),
            &references,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownDemographic(code) if code == "0000"));
    }

    #[test]
    fn test_unknown_definition_fails() {
        let err = DefinitionFallback::classify(
            &entry_with_definition("Allergies", ""),
            &mut DataCriteria::new("c"),
            &CriteriaRegistry::new(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unknown data criteria template identifier [Allergies]");
    }

    #[test]
    fn test_missing_reference_defaults_to_variable() {
        let entry = Element::parse(
            r#"<entry><observationCriteria><outboundRelationship typeCode="OCCR">
                 <criteriaReference><id root="1.2" extension="Gone"/></criteriaReference>
               </outboundRelationship></observationCriteria></entry>"#,
        )
        .unwrap();
        let mut criteria = DataCriteria::new("c");
        DefinitionFallback::classify(&entry, &mut criteria, &CriteriaRegistry::new()).unwrap();
        assert_eq!(criteria.definition, Some(Definition::Variable));
    }

    #[test]
    fn test_reference_copy_for_specific_occurrence() {
        let entry = Element::parse(
            r#"<entry><encounterCriteria><outboundRelationship typeCode="OCCR">
                 <criteriaReference><id root="1.2" extension="Visit"/></criteriaReference>
               </outboundRelationship></encounterCriteria></entry>"#,
        )
        .unwrap();

        let mut references = CriteriaRegistry::new();
        let mut visit = DataCriteria::new("Visit_12");
        visit.definition = Some(Definition::Encounter);
        visit.status = Some("performed".to_string());
        visit.description = Some("Encounter, Performed".to_string());
        visit.code_list_id = Some("2.16.1".to_string());
        references.insert(visit);

        let mut criteria = DataCriteria::new("OccurrenceA_Visit_12");
        criteria.specific_occurrence = Some('A');
        DefinitionFallback::classify(&entry, &mut criteria, &references).unwrap();

        assert_eq!(criteria.definition, Some(Definition::Encounter));
        assert_eq!(criteria.status.as_deref(), Some("performed"));
        assert_eq!(criteria.code_list_id.as_deref(), Some("2.16.1"));
        assert_eq!(criteria.title.as_deref(), Some("Encounter, Performed"));
    }

    #[test]
    fn test_related_value_set() {
        let entry = Element::parse(
            r#"<entry><encounterCriteria><outboundRelationship typeCode="REFR">
                 <observationCriteria><value valueSet="2.16.840.1.113883.3.67"/></observationCriteria>
               </outboundRelationship></encounterCriteria></entry>"#,
        )
        .unwrap();
        assert_eq!(related_value_set(&entry).as_deref(), Some("2.16.840.1.113883.3.67"));
    }
}
