//! End-to-end extraction tests
//!
//! Each test feeds entries through a [`ParseSession`] the way a caller would
//! and checks the registered or exported criteria.

use hqmf_criteria::{
    models::{Definition, DerivationOperator, Quantity, Value},
    registry::REASON_FIELD,
    tokens,
    xml::Element,
    Error, ParseSession, Registries,
};

const OFFICE_VISIT: &str = "2.16.840.1.113883.3.464.1003.101.12.1001";

fn registries() -> Registries {
    Registries::builtin().unwrap()
}

fn entry(xml: &str) -> Element {
    Element::parse(xml).unwrap()
}

/// Plain encounter criteria `<extension>_1.2` with the office visit value set
fn encounter(extension: &str) -> Element {
    entry(&format!(
        r#"<entry><encounterCriteria classCode="ENC" moodCode="EVN">
             <templateId><item root="2.16.840.1.113883.10.20.28.3.17"/></templateId>
             <id root="1.2" extension="{extension}"/>
             <code valueSet="{OFFICE_VISIT}"><displayName value="Office Visit Grouping Value Set"/></code>
             <title value="Encounter, Performed"/>
           </encounterCriteria></entry>"#
    ))
}

/// Encounter criteria that is an occurrence of `source`
fn occurrence_of(extension: &str, source: &str) -> Element {
    entry(&format!(
        r#"<entry><encounterCriteria classCode="ENC" moodCode="EVN">
             <templateId><item root="2.16.840.1.113883.10.20.28.3.17"/></templateId>
             <id root="1.2" extension="{extension}"/>
             <outboundRelationship typeCode="OCCR">
               <criteriaReference><id root="1.2" extension="{source}"/></criteriaReference>
             </outboundRelationship>
           </encounterCriteria></entry>"#
    ))
}

/// Template-less grouper over `children` joined by `conjunctions`
fn grouper(extension: &str, children: &[(&str, &str)]) -> Element {
    let relationships: String = children
        .iter()
        .map(|(conjunction, child)| {
            format!(
                r#"<outboundRelationship typeCode="COMP"><conjunctionCode code="{conjunction}"/>
                     <criteriaReference><id root="1.2" extension="{child}"/></criteriaReference>
                   </outboundRelationship>"#
            )
        })
        .collect();
    entry(&format!(
        r#"<entry><grouperCriteria classCode="GROUPER" moodCode="EVN">
             <id root="1.2" extension="{extension}"/>
             <code valueSet="{OFFICE_VISIT}"/>
             {relationships}
           </grouperCriteria></entry>"#
    ))
}

#[test]
fn test_normalized_ids_are_stable() {
    for raw in ["OccurrenceA_Encounter_1.2.3", "2.16.840.1", "qdm_var_Visits-2", "já_1"] {
        let once = tokens::normalize(raw);
        assert_eq!(tokens::normalize(&once), once, "normalizing {raw} twice");
    }
}

#[test]
fn test_registry_template_wins_over_definition_element() {
    let registries = registries();
    let mut session = ParseSession::new(&registries);
    session
        .add_entry(&entry(
            r#"<entry><encounterCriteria>
                 <templateId><item root="2.16.840.1.113883.10.20.28.3.17"/></templateId>
                 <id root="1.2" extension="Visit"/>
                 <definition><observationReference><id root="1.2" extension="Result"/></observationReference></definition>
               </encounterCriteria></entry>"#,
        ))
        .unwrap();

    let criteria = session.references().get("Visit_12").unwrap();
    assert_eq!(criteria.definition, Some(Definition::Encounter));
    assert_eq!(criteria.status.as_deref(), Some("performed"));
}

#[test]
fn test_conjunctions() {
    let registries = registries();
    let mut session = ParseSession::new(&registries);
    session.add_entry(&encounter("A")).unwrap();
    session.add_entry(&encounter("B")).unwrap();

    session
        .add_entry(&grouper("Either", &[("OR", "A"), ("OR", "B")]))
        .unwrap();
    session
        .add_entry(&grouper("Both", &[("AND", "A"), ("AND", "B")]))
        .unwrap();

    let either = session.references().get("Either_12").unwrap();
    assert_eq!(either.derivation_operator, Some(DerivationOperator::Union));
    let both = session.references().get("Both_12").unwrap();
    assert!(both.derivation_operator.is_some_and(|op| op.is_intersect()));

    let err = session
        .add_entry(&grouper("Mixed", &[("OR", "A"), ("AND", "B")]))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ConflictingConjunction { ref first, ref second, .. } if first == "UNION" && second == "XPRODUCT"
    ));
}

#[test]
fn test_occurrence_letters() {
    let registries = registries();
    let mut session = ParseSession::new(&registries);
    session.add_entry(&encounter("Visit")).unwrap();
    session.add_entry(&occurrence_of("OccurrenceA_Visit", "Visit")).unwrap();
    session.add_entry(&occurrence_of("OccurrenceB_Visit", "Visit")).unwrap();
    session.add_entry(&occurrence_of("Followup", "Visit")).unwrap();

    let letter = |id: &str| session.references().get(id).unwrap().specific_occurrence;
    assert_eq!(letter("OccurrenceA_Visit_12"), Some('A'));
    assert_eq!(letter("OccurrenceB_Visit_12"), Some('B'));
    assert_eq!(letter("Followup_12"), Some('A'));

    let followup = session.references().get("Followup_12").unwrap();
    assert_eq!(followup.source_data_criteria.as_deref(), Some("Visit_12"));
    assert_eq!(followup.specific_occurrence_const.as_deref(), Some("VISIT_12"));
}

#[test]
fn test_untagged_references_share_first_letter() {
    let registries = registries();
    let mut session = ParseSession::new(&registries);
    session.add_entry(&encounter("Visit")).unwrap();
    session
        .add_entry(&entry(
            r#"<entry>
                 <localVariableName value="qdm_var_Repeat_2"/>
                 <encounterCriteria classCode="ENC" moodCode="EVN">
                   <templateId><item root="2.16.840.1.113883.10.20.28.3.17"/></templateId>
                   <id root="1.2" extension="qdm_var_Repeat"/>
                   <outboundRelationship typeCode="OCCR">
                     <criteriaReference><id root="1.2" extension="Visit"/></criteriaReference>
                   </outboundRelationship>
                 </encounterCriteria>
               </entry>"#,
        ))
        .unwrap();
    session.add_entry(&occurrence_of("OccurrenceB_Visit", "Visit")).unwrap();
    session.add_entry(&occurrence_of("Followup", "Visit")).unwrap();

    let letter = |id: &str| session.references().get(id).unwrap().specific_occurrence;
    assert_eq!(letter("qdm_var_Repeat_12"), Some('A'));
    assert_eq!(letter("OccurrenceB_Visit_12"), Some('B'));
    assert_eq!(letter("Followup_12"), letter("qdm_var_Repeat_12"));

    // the variable's placeholder keeps the slot
    assert_eq!(session.occurrences().get("Visit_12"), Some(None));
    assert_eq!(session.occurrences().len(), 1);
}

#[test]
fn test_untagged_occurrence_without_mapping_fails() {
    let registries = registries();
    let mut session = ParseSession::new(&registries);
    session.add_entry(&encounter("Visit")).unwrap();

    let err = session.add_entry(&occurrence_of("Followup", "Visit")).unwrap_err();
    assert!(matches!(err, Error::MissingOccurrenceMapping { .. }));
    assert!(err.to_string().contains("Visit_1.2"));
}

#[test]
fn test_result_values() {
    let lab = |value: &str| {
        entry(&format!(
            r#"<entry xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><observationCriteria>
                 <templateId><item root="2.16.840.1.113883.10.20.28.3.29"/></templateId>
                 <id root="1.2" extension="Weight"/>
                 <code valueSet="2.16.840.1.113883.3.464.1003.121.12.1009"/>
                 {value}
               </observationCriteria></entry>"#
        ))
    };

    let registries = registries();
    let mut session = ParseSession::new(&registries);
    session
        .add_entry(&lab(r#"<value xsi:type="PQ" value="18" unit="kg"/>"#))
        .unwrap();
    assert_eq!(
        session.references().get("Weight_12").unwrap().value,
        Some(Value::Quantity(Quantity {
            value: Some("18".to_string()),
            unit: Some("kg".to_string()),
        }))
    );

    let err = session
        .add_entry(&lab(r#"<value xsi:type="IVL_XYZ" value="18"/>"#))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown value type [IVL_XYZ]");
}

#[test]
fn test_variable_aliasing_single_criteria() {
    let registries = registries();
    let mut session = ParseSession::new(&registries);
    session.add_entry(&encounter("Visit")).unwrap();
    session
        .add_entry(&entry(
            r#"<entry>
                 <localVariableName value="qdm_var_FirstVisit_4"/>
                 <grouperCriteria>
                   <id root="1.2" extension="qdm_var_FirstVisit"/>
                   <outboundRelationship typeCode="COMP">
                     <subsetCode code="SOURCE"/>
                     <criteriaReference><id root="1.2" extension="Visit"/></criteriaReference>
                   </outboundRelationship>
                 </grouperCriteria>
               </entry>"#,
        ))
        .unwrap();

    // no GROUP_ entity: the alias points at the visit directly
    assert_eq!(session.references().ids(), vec!["Visit_12", "qdm_var_FirstVisit_12"]);
    let alias = session.references().get("qdm_var_FirstVisit_12").unwrap();
    assert!(alias.do_not_group);
    assert_eq!(alias.children_criteria, vec!["Visit_12"]);
    assert_eq!(alias.description.as_deref(), Some("Encounter, Performed"));
}

#[test]
fn test_variable_without_children_adopts_source() {
    let registries = registries();
    let mut session = ParseSession::new(&registries);
    session.add_entry(&encounter("Visit")).unwrap();
    session
        .add_entry(&entry(
            r#"<entry>
                 <localVariableName value="qdm_var_FirstVisit_4"/>
                 <grouperCriteria>
                   <templateId><item root="0.1.2.3.4.5.6.7.8.9.1"/></templateId>
                   <id root="1.2" extension="qdm_var_FirstVisit"/>
                   <outboundRelationship typeCode="DRIV">
                     <subsetCode code="SOURCE"/>
                     <criteriaReference><id root="1.2" extension="Visit"/></criteriaReference>
                   </outboundRelationship>
                 </grouperCriteria>
               </entry>"#,
        ))
        .unwrap();

    let alias = session.references().get("qdm_var_FirstVisit_12").unwrap();
    assert_eq!(alias.children_criteria, vec!["Visit_12"]);
    assert_eq!(alias.derivation_operator, None);
    assert!(alias.do_not_group);
    assert!(!session.references().contains("GROUP_qdm_var_FirstVisit_12"));
}

#[test]
fn test_negation_reason() {
    let medication = |negated: bool| {
        entry(&format!(
            r#"<entry xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
                 <substanceAdministrationCriteria actionNegationInd="{negated}">
                   <templateId><item root="2.16.840.1.113883.10.20.28.3.42"/></templateId>
                   <id root="1.2" extension="Aspirin{negated}"/>
                   <outboundRelationship typeCode="RSON">
                     <observationCriteria>
                       <code code="410666004" codeSystem="2.16.840.1.113883.6.96"/>
                       <value xsi:type="CD" valueSet="2.16.840.1.113883.3.117.1.7.1.93"/>
                     </observationCriteria>
                   </outboundRelationship>
                 </substanceAdministrationCriteria>
               </entry>"#
        ))
    };

    let registries = registries();
    let mut session = ParseSession::new(&registries);
    session.add_entry(&medication(true)).unwrap();
    session.add_entry(&medication(false)).unwrap();

    let negated = session.references().get("Aspirintrue_12").unwrap();
    assert!(negated.negation);
    assert_eq!(
        negated.negation_code_list_id.as_deref(),
        Some("2.16.840.1.113883.3.117.1.7.1.93")
    );
    assert!(!negated.field_values.contains_key(REASON_FIELD));

    let plain = session.references().get("Aspirinfalse_12").unwrap();
    assert!(!plain.negation);
    assert!(plain.negation_code_list_id.is_none());
    assert!(plain.field_values.contains_key(REASON_FIELD));
}

#[test]
fn test_derived_criteria_export_no_code_list() {
    let registries = registries();
    let mut session = ParseSession::new(&registries);
    session.add_entry(&encounter("A")).unwrap();
    session.add_entry(&encounter("B")).unwrap();
    session
        .add_entry(&grouper("Either", &[("OR", "A"), ("OR", "B")]))
        .unwrap();

    // the grouper's own code element is read but never exported
    assert_eq!(
        session.references().get("Either_12").unwrap().code_list_id().as_deref(),
        Some(OFFICE_VISIT)
    );

    let exported = session.finish().unwrap();
    let either = exported.iter().find(|c| c.id == "Either_12").unwrap();
    assert_eq!(either.definition, Definition::Derived);
    assert!(either.code_list_id.is_none());
    assert_eq!(either.children_criteria.as_deref(), Some(&["A_12".to_string(), "B_12".to_string()][..]));
}

#[test]
fn test_exported_leaf() {
    let registries = registries();
    let mut session = ParseSession::new(&registries);
    session.add_entry(&encounter("Visit")).unwrap();
    let exported = session.finish().unwrap();

    insta::assert_snapshot!(
        serde_json::to_string(&exported[0]).unwrap(),
        @r#"{"id":"Visit_12","title":"Office Visit","description":"Encounter, Performed: Office Visit","code_list_id":"2.16.840.1.113883.3.464.1003.101.12.1001","definition":"encounter","status":"performed","negation":false,"variable":false}"#
    );
}
