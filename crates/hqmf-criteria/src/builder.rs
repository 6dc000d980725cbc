//! Data criteria builder
//!
//! Builds one [`DataCriteria`] from one entry. Construction order matters:
//! occurrence linkage must exist before composition is read, field
//! extraction consults negation, and classification may copy from criteria
//! referenced by the entry.

use crate::{
    classifier::{related_value_set, DefinitionFallback, TemplateClassifier},
    derivation::DerivationResolver,
    extractor::{
        self, ChildrenExtractor, CommentExtractor, CriteriaExtractor, DescriptionExtractor,
        FieldExtractor, NegationExtractor, SubsetExtractor, TemporalExtractor, ValueParser,
    },
    models::{CodeListNode, DataCriteria},
    occurrence::{OccurrenceRegistry, OccurrenceResolver},
    registry::{CriteriaRegistry, Registries},
    tokens,
    xml::{Element, Path},
    Result,
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static VARIABLE_OCCURRENCE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^occ[A-Z]of_qdm_var_").unwrap());

/// Where the code list lives when no template maps it elsewhere
const DEFAULT_CODE_LIST_PATH: &str = "./*/cda:code";

pub struct DataCriteriaBuilder<'a> {
    registries: &'a Registries,
}

impl<'a> DataCriteriaBuilder<'a> {
    pub fn new(registries: &'a Registries) -> Self {
        Self { registries }
    }

    /// Build the criteria for `entry`
    ///
    /// `references` holds the criteria built from earlier entries; the
    /// occurrence registry is updated with any letter this entry introduces.
    pub fn build(
        &self,
        entry: &Element,
        references: &CriteriaRegistry,
        occurrences: &mut OccurrenceRegistry,
    ) -> Result<DataCriteria> {
        let (extension, root) = extractor::criteria_id(entry)?;
        let mut criteria =
            DataCriteria::new(extractor::raw_id(extension.as_deref(), root.as_deref()));
        criteria.id_extension = extension;
        criteria.template_ids = extractor::template_ids(entry)?;
        criteria.local_variable_name = extractor::local_variable_name(entry)?;
        criteria.status = extractor::status(entry)?;
        criteria.description = DescriptionExtractor::extract(entry, self.is_variable(&criteria))?;
        debug!("Building criteria {}", criteria.id);

        criteria.verbose_reference = Self::is_verbose_reference(entry, &criteria, references)?;
        NegationExtractor.extract(entry, &mut criteria)?;
        OccurrenceResolver::resolve(entry, &mut criteria, references, occurrences)?;
        TemporalExtractor.extract(entry, &mut criteria)?;
        criteria.derivation_operator = DerivationResolver::extract(entry, &criteria.id)?;
        FieldExtractor::new(&self.registries.fields).extract(entry, &mut criteria)?;
        ChildrenExtractor.extract(entry, &mut criteria)?;
        CommentExtractor.extract(entry, &mut criteria)?;
        criteria.variable = self.is_variable(&criteria);
        SubsetExtractor.extract(entry, &mut criteria)?;

        if !TemplateClassifier::new(&self.registries.templates).classify(&mut criteria) {
            DefinitionFallback::classify(entry, &mut criteria, references)?;
        }

        self.resolve_code_list(entry, &mut criteria, references)?;
        if criteria.definition.is_some_and(|d| d.is_transfer()) && criteria.code_list_id().is_none() {
            criteria.code_list_id = related_value_set(entry);
        }

        Self::normalize_ids(&mut criteria);
        DerivationResolver::set_intersection(&mut criteria);
        Self::handle_specific_variables(&mut criteria, references);

        Ok(criteria)
    }

    fn is_variable(&self, criteria: &DataCriteria) -> bool {
        extractor::is_variable(criteria.local_variable_name.as_deref(), &criteria.id)
    }

    /// A grouper wrapping exactly one registered variable
    fn is_verbose_reference(
        entry: &Element,
        criteria: &DataCriteria,
        references: &CriteriaRegistry,
    ) -> Result<bool> {
        if entry.child("grouperCriteria").is_none() {
            return Ok(false);
        }
        let referenced = entry.select("./*/cda:outboundRelationship/cda:criteriaReference/cda:id")?;
        let [id] = referenced.as_slice() else {
            return Ok(false);
        };

        let reference_id = tokens::reference_id(id.attr("extension"), id.attr("root"));
        let wraps_variable = references
            .get(&reference_id)
            .is_some_and(|reference| reference.variable);
        let own_extension = criteria.id_extension.as_deref().unwrap_or_default();

        Ok(wraps_variable && !VARIABLE_OCCURRENCE_ID.is_match(own_extension))
    }

    /// Locate the code list node and the result value for the entry's templates
    fn resolve_code_list(
        &self,
        entry: &Element,
        criteria: &mut DataCriteria,
        references: &CriteriaRegistry,
    ) -> Result<()> {
        let value_paths = &self.registries.value_paths;
        let mut code_list_path = Path::parse(DEFAULT_CODE_LIST_PATH)?;

        if criteria.template_ids.is_empty() && criteria.specific_occurrence.is_some() {
            // template-less occurrences take the result location of their source
            let source_templates = criteria
                .source_data_criteria
                .as_deref()
                .and_then(|source| references.get(&tokens::normalize(source)))
                .map(|source| source.template_ids.clone())
                .unwrap_or_default();
            if let Some(result_path) = source_templates
                .first()
                .and_then(|template| value_paths.lookup(template))
                .and_then(|mapping| mapping.result_path.as_ref())
            {
                criteria.value = ValueParser::parse_path(entry, result_path)?;
            }
        } else {
            for template_id in &criteria.template_ids {
                let Some(mapping) = value_paths.lookup(template_id) else {
                    continue;
                };
                let Some(valueset_path) = &mapping.valueset_path else {
                    continue;
                };
                if valueset_path.select(entry).is_empty() {
                    continue;
                }
                code_list_path = valueset_path.clone();
                if let Some(result_path) = &mapping.result_path {
                    criteria.value = ValueParser::parse_path(entry, result_path)?;
                }
            }
        }

        criteria.code_list = code_list_path
            .select(entry)
            .into_iter()
            .next()
            .map(Self::code_list_node)
            .unwrap_or_default();
        Ok(())
    }

    fn code_list_node(node: &Element) -> CodeListNode {
        let owned = |name: &str| node.attr(name).map(str::to_string);
        CodeListNode {
            display_name: node
                .child("displayName")
                .and_then(|d| d.attr("value"))
                .map(str::to_string),
            value_set: owned("valueSet"),
            code: owned("code"),
            code_system: owned("codeSystem"),
            code_system_name: owned("codeSystemName"),
        }
    }

    fn normalize_ids(criteria: &mut DataCriteria) {
        criteria.id = tokens::normalize(&criteria.id);
        for child in &mut criteria.children_criteria {
            *child = tokens::normalize(child);
        }
        if let Some(source) = &mut criteria.source_data_criteria {
            *source = tokens::normalize(source);
        }
        if let Some(constant) = &mut criteria.specific_occurrence_const {
            *constant = tokens::normalize(constant);
        }
    }

    /// Derived criteria standing in for a single other criteria alias it
    fn handle_specific_variables(criteria: &mut DataCriteria, references: &CriteriaRegistry) {
        if !criteria.is_derived() {
            return;
        }
        if criteria.children_criteria.is_empty() {
            if let Some(source) = &criteria.source_data_criteria {
                criteria.children_criteria.push(source.clone());
            }
        }

        let [child] = criteria.children_criteria.as_slice() else {
            return;
        };
        let self_reference = criteria
            .source_data_criteria
            .as_ref()
            .is_none_or(|source| source == child);
        if !self_reference {
            return;
        }
        let Some(reference) = references.get(child) else {
            return;
        };

        debug!("{} aliases {}", criteria.id, reference.id);
        criteria.do_not_group = true;
        if criteria.subset_operators.is_empty() {
            criteria.subset_operators = reference.subset_operators.clone();
        }
        if criteria.derivation_operator.is_none() {
            criteria.derivation_operator = reference.derivation_operator;
        }
        criteria.description = reference.description.clone();
        criteria.variable = reference.variable;
    }
}
