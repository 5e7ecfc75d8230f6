//! State table service
//!
//! Owns the decoded states, their levels and the optional settings store
//! the table is persisted to. This is the entry point used by the CLI.

use super::{
    AnalysisReport, LevelEngine, StateGraph, StateNode, StateStore, Transition, analyzer, graph,
};
use crate::parser::{Input, StateNumber, StateRecord, Token};
use crate::settings::{STATES_KEY, SettingsStore};
use crate::{Error, Result};

pub struct StateService {
    store: StateStore,
    engine: LevelEngine,
    settings: Option<Box<dyn SettingsStore>>,
    settings_key: String,
}

impl Default for StateService {
    fn default() -> Self {
        Self::new()
    }
}

impl StateService {
    /// In-memory service without persistence
    pub fn new() -> Self {
        Self {
            store: StateStore::new(),
            engine: LevelEngine::new(),
            settings: None,
            settings_key: STATES_KEY.to_string(),
        }
    }

    /// Service persisted to `settings`, starting from the states saved there
    pub fn with_settings(settings: Box<dyn SettingsStore>) -> Result<Self> {
        Self::with_settings_key(settings, STATES_KEY)
    }

    pub fn with_settings_key(
        settings: Box<dyn SettingsStore>,
        key: impl Into<String>,
    ) -> Result<Self> {
        let key = key.into();
        let store = match settings.get(&key)? {
            Some(value) => StateStore::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Ignoring saved states under {:?}: {}", key, e);
                StateStore::new()
            }),
            None => StateStore::new(),
        };
        tracing::debug!("Loaded {} saved states", store.len());

        Ok(Self {
            store,
            engine: LevelEngine::new(),
            settings: Some(settings),
            settings_key: key,
        })
    }

    pub fn with_disconnected_gap(mut self, gap: u32) -> Self {
        self.engine = self.engine.with_disconnected_gap(gap);
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn engine(&self) -> &LevelEngine {
        &self.engine
    }

    fn persist(&mut self) -> Result<()> {
        if let Some(settings) = self.settings.as_mut() {
            let value = self.store.to_value()?;
            settings.set(&self.settings_key, value)?;
        }
        Ok(())
    }

    fn insert(&mut self, record: StateRecord) -> Result<StateNumber> {
        tracing::info!("State {} processed: {:?}", record.number, record);
        let number = record.number.clone();
        self.store.put(record);
        self.persist()?;
        Ok(number)
    }

    /// Add a state given as a 28-character record
    pub fn add_record(&mut self, record: &str) -> Result<StateNumber> {
        let decoded = crate::parser::decode(record).inspect_err(|e| tracing::info!("{}", e))?;
        self.insert(decoded)
    }

    /// Add a state given as a token list
    pub fn add_tokens(&mut self, tokens: &[Token]) -> Result<StateNumber> {
        let record = crate::parser::normalize(tokens).inspect_err(|e| tracing::error!("{}", e))?;
        self.add_record(&record)
    }

    pub fn add(&mut self, input: &Input) -> Result<StateNumber> {
        match input {
            Input::Record(record) => self.add_record(record),
            Input::Tokens(tokens) => self.add_tokens(tokens),
        }
    }

    /// Add several states, stopping at the first invalid one.
    ///
    /// States added before the failure stay in the table.
    pub fn add_batch<'a, I>(&mut self, inputs: I) -> Result<Vec<StateNumber>>
    where
        I: IntoIterator<Item = &'a Input>,
    {
        let mut added = Vec::new();
        for input in inputs {
            match self.add(input) {
                Ok(number) => added.push(number),
                Err(e) if e.is_record_error() => {
                    tracing::info!("Error processing state {:?}", input);
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!("Failed to store state {:?}: {}", input, e);
                    return Err(e);
                }
            }
        }
        Ok(added)
    }

    pub fn get(&self, number: &str) -> Option<&StateRecord> {
        self.store.get(number)
    }

    /// Delete a state, returning whether it existed
    pub fn delete(&mut self, number: &str) -> Result<bool> {
        if !self.store.delete(number) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn records(&self) -> impl Iterator<Item = &StateRecord> {
        self.store.records()
    }

    /// Graph nodes; recomputes every level
    pub fn nodes(&mut self) -> Result<Vec<StateNode>> {
        graph::nodes(&self.store, &mut self.engine)
    }

    pub fn edges(&self) -> Vec<Transition> {
        graph::edges(&self.store)
    }

    pub fn graph(&mut self) -> Result<StateGraph> {
        StateGraph::build(&self.store, &mut self.engine)
    }

    pub fn analyze(&mut self) -> Result<AnalysisReport> {
        analyzer::analyze(&self.store, &mut self.engine)
    }

    /// Look up a state or fail with [`Error::StateNotFound`]
    pub fn require(&self, number: &str) -> Result<&StateRecord> {
        self.get(number)
            .ok_or_else(|| Error::StateNotFound(number.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;
    use serde_json::Value;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Settings store that shares its content with the test
    #[derive(Clone, Default)]
    struct SharedSettings(Rc<RefCell<MemorySettings>>);

    impl SettingsStore for SharedSettings {
        fn get(&self, key: &str) -> Result<Option<Value>> {
            self.0.borrow().get(key)
        }

        fn set(&mut self, key: &str, value: Value) -> Result<()> {
            self.0.borrow_mut().set(key, value)
        }
    }

    #[test]
    fn test_add_record_and_tokens() {
        let mut service = StateService::new();
        assert_eq!(
            service.add_record("000A870500128002002002001127").unwrap(),
            "000"
        );

        let tokens: Vec<Token> = vec![
            2.into(),
            "J".into(),
            132.into(),
            0.into(),
            132.into(),
            136.into(),
            132.into(),
            0.into(),
            120.into(),
            264.into(),
        ];
        assert_eq!(service.add_tokens(&tokens).unwrap(), "002");
        assert_eq!(service.require("002").unwrap().state_type(), 'J');
        assert!(matches!(
            service.require("003"),
            Err(Error::StateNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_inputs_are_not_added() {
        let mut service = StateService::new();
        assert!(service.add_record("").is_err());
        assert!(service.add_record("XYZA870500128002002002001127").is_err());
        assert!(service.add(&Input::from_line("0 AX 870 500 128 2 2 0 21 000")).is_err());
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_batch_is_fail_fast_without_rollback() {
        let mut service = StateService::new();
        let inputs: Vec<Input> = [
            "000A870500128002002002001127",
            "xyzAxyz500128002002002001127",
            "004D024000000128000000000000",
        ]
        .iter()
        .map(|r| Input::from(*r))
        .collect();

        assert!(service.add_batch(&inputs).is_err());
        assert!(service.get("000").is_some());
        assert!(service.get("004").is_none());
    }

    #[test]
    fn test_batch_adds_all_valid_inputs() {
        let mut service = StateService::new();
        let inputs: Vec<Input> = [
            "000A870500128002002002001127",
            "001K003004004127127127127127",
            "002J132000132136132000081178",
            "003D024000128000000000000000",
            "004D024000000128000000000000",
        ]
        .iter()
        .map(|r| Input::from(*r))
        .collect();

        let added = service.add_batch(&inputs).unwrap();
        assert_eq!(added, vec!["000", "001", "002", "003", "004"]);
    }

    #[test]
    fn test_persists_after_insert_and_delete() {
        let shared = SharedSettings::default();
        let mut service = StateService::with_settings(Box::new(shared.clone())).unwrap();

        service.add_record("000A870500128002002002001127").unwrap();
        service.add_record("500K003004004127127127127127").unwrap();
        let saved = shared.get(STATES_KEY).unwrap().unwrap();
        assert_eq!(saved["500"]["type"], "K");

        assert!(service.delete("500").unwrap());
        assert!(!service.delete("500").unwrap());
        let saved = shared.get(STATES_KEY).unwrap().unwrap();
        assert!(saved.get("500").is_none());

        let reloaded = StateService::with_settings(Box::new(shared)).unwrap();
        assert_eq!(reloaded.store().len(), 1);
        assert_eq!(reloaded.get("000").map(|r| r.state_type()), Some('A'));
    }

    #[test]
    fn test_malformed_saved_states_are_ignored() {
        let settings = MemorySettings::new().with_value(STATES_KEY, Value::from("garbage"));
        let service = StateService::with_settings(Box::new(settings)).unwrap();
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_nodes_and_edges() {
        let mut service = StateService::new();
        service.add_record("000A870500128002002002001127").unwrap();
        service.add_record("500K003004004127127127127127").unwrap();

        let nodes = service.nodes().unwrap();
        assert_eq!(
            nodes,
            vec![
                StateNode::new("000".into(), "000 A".into(), 1),
                StateNode::new("500".into(), "500 K".into(), 2),
            ]
        );
        assert_eq!(service.edges().len(), 10);
    }

    #[test]
    fn test_nodes_without_root() {
        let mut service = StateService::new();
        service.add_record("500K003004004127127127127127").unwrap();
        assert!(matches!(service.nodes(), Err(Error::MissingRoot)));
    }
}
