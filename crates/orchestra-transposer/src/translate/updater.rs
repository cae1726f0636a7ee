// crates/orchestra-transposer/src/translate/updater.rs

//! Orchestra 1.0 → 1.1 upgrade.
//!
//! Structural passthrough of every collection plus the two genuine 1.1
//! transformations: numeric coercion of each code's `sort` attribute and
//! harvesting of the distinct `(scenario, scenarioId)` pairs into a
//! first-class scenario collection.

use std::io::{BufRead, Write};

use log::{error, warn};

use crate::error::TransposerError;
use crate::orchestra::{
    Orchestra10, Orchestra11, OrchestraInstance10, OrchestraInstance11, Repository,
};
use crate::xml::Node;

/// Scenario assumed when an element declares none.
const DEFAULT_SCENARIO: (&str, i64) = ("base", 1);

/// Upgrades an Orchestra version 1.0 repository to version 1.1.
#[derive(Debug, Default)]
pub struct OrchestraUpdater;

impl OrchestraUpdater {
    pub fn new() -> Self {
        OrchestraUpdater
    }

    /// Upgrades a decoded 1.0 instance, consuming it; subtrees move into the
    /// 1.1 tree without copying.
    pub fn update(&self, orch10: OrchestraInstance10) -> OrchestraInstance11 {
        let scenarios = self.harvest_scenarios(&orch10);

        let mut orch10 = orch10;
        let mut orch11 = OrchestraInstance11::new();

        // Repository attributes minus the 1.0 schema location.
        for (key, value) in orch10.root().attrs() {
            if key == "xsi:schemaLocation" {
                continue;
            }
            orch11.root_mut().set_attr(key.to_string(), value.clone());
        }

        move_children(orch10.metadata(), orch11.metadata());
        move_children(orch10.datatypes_mut(), orch11.datatypes_mut());
        self.update_codesets(&mut orch10);
        move_children(orch10.codesets_mut(), orch11.codesets_mut());
        move_children(orch10.fields_mut(), orch11.fields_mut());
        move_children(orch10.components_mut(), orch11.components_mut());
        move_children(orch10.groups_mut(), orch11.groups_mut());
        move_children(orch10.messages_mut(), orch11.messages_mut());

        for (name, id) in scenarios {
            let mut scenario = Node::new("fixr:scenario");
            scenario.set_attr("id", id);
            scenario.set_attr("name", name);
            orch11.append_scenario(scenario);
        }
        orch11
    }

    /// Upgrades a 1.0 document stream into a 1.1 document stream.
    ///
    /// Decode findings abort the conversion and are returned as the error
    /// list; no output is written in that case.
    pub fn update_xml<R: BufRead, W: Write>(
        &self,
        orch10_xml: R,
        orch11_out: W,
    ) -> Result<Vec<TransposerError>, TransposerError> {
        let (orch10, errors) = Orchestra10::read_xml(orch10_xml)?;
        if !errors.is_empty() {
            for e in &errors {
                error!("{e}");
            }
            return Ok(errors);
        }
        let orch11 = self.update(orch10);
        let errors = Orchestra11::write_xml(&orch11, orch11_out)?;
        for e in &errors {
            error!("{e}");
        }
        Ok(errors)
    }

    /// The distinct `(scenario, scenarioId)` pairs declared across fields,
    /// groups, and messages, in first-occurrence order.
    fn harvest_scenarios(&self, orch10: &OrchestraInstance10) -> Vec<(String, i64)> {
        let mut scenarios: Vec<(String, i64)> = Vec::new();
        let elements = orch10
            .fields()
            .chain(orch10.groups())
            .chain(orch10.messages());
        for element in elements {
            let name = element
                .attr_text("scenario")
                .map(|s| s.into_owned())
                .unwrap_or_else(|| DEFAULT_SCENARIO.0.to_string());
            let id = element.attr_i64("scenarioId").unwrap_or(DEFAULT_SCENARIO.1);
            let pair = (name, id);
            if !scenarios.contains(&pair) {
                scenarios.push(pair);
            }
        }
        scenarios
    }

    /// Coerces each code's `sort` attribute from string to integer; a
    /// non-numeric value stays as written.
    fn update_codesets(&self, orch10: &mut OrchestraInstance10) {
        for codeset in orch10
            .codesets_mut()
            .children_mut()
            .iter_mut()
            .filter(|c| c.name() == "fixr:codeSet")
        {
            for code in codeset
                .children_mut()
                .iter_mut()
                .filter(|c| c.name() == "fixr:code")
            {
                let Some(sort) = code.attr_str("sort").map(str::to_string) else {
                    continue;
                };
                match sort.trim().parse::<i64>() {
                    Ok(value) => code.set_attr("sort", value),
                    Err(_) => warn!("could not convert sort value '{sort}' to integer"),
                }
            }
        }
    }
}

fn move_children(source: &mut Node, target: &mut Node) {
    target.children_mut().append(source.children_mut());
}
