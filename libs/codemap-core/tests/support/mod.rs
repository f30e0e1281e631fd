//! In-memory `MapperApi` for workflow tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use codemap_core::{
    Acknowledgement, Category, Code, CodeGroup, CuiDetails, Error, MapperApi, MappingPayload,
    MappingRow, MasterItem, Result, SelectedItem, TextToCui,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub code_id: i64,
    pub items: Vec<SelectedItem>,
    pub client: String,
}

#[derive(Default)]
struct State {
    codes: Vec<Code>,
    master: HashMap<Category, Vec<MasterItem>>,
    code_data: HashMap<(i64, Category), Vec<MasterItem>>,
    clients: Vec<String>,
    groups: HashMap<i64, Vec<CodeGroup>>,
    mappings: Vec<(Category, MappingPayload)>,
    submissions: Vec<Submission>,
    submit_ack: Option<Acknowledgement>,
    failing: HashSet<String>,
    failing_categories: HashSet<Category>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct MockApi {
    state: Mutex<State>,
}

pub fn item(id: i64, text: &str) -> MasterItem {
    MasterItem {
        id,
        text: text.to_string(),
    }
}

pub fn code(id: i64, code: &str) -> Code {
    Code {
        id,
        code: code.to_string(),
    }
}

impl MockApi {
    /// Two codes, a few labs and medications, and three clients.
    pub fn seeded() -> Self {
        let api = Self::default();
        {
            let mut s = api.state.lock().unwrap();
            s.codes = vec![code(1, "A00.1"), code(2, "B20.3")];
            s.master.insert(
                Category::Labs,
                vec![item(5, "CBC"), item(6, "Hemoglobin A1c")],
            );
            s.master
                .insert(Category::Medications, vec![item(7, "Metformin")]);
            s.code_data
                .insert((1, Category::Labs), vec![item(5, "CBC"), item(6, "Hemoglobin A1c")]);
            s.code_data
                .insert((1, Category::Medications), vec![item(7, "Metformin")]);
            s.code_data.insert(
                (1, Category::MustRequiredCondition),
                vec![item(9, "Pregnancy")],
            );
            s.clients = vec!["ABC Healthcare".into(), "City Clinic".into()];
            s.groups.insert(
                1,
                vec![
                    CodeGroup {
                        group_id: 10,
                        client: Some("City Clinic".into()),
                        major_masters: Vec::new(),
                    },
                    CodeGroup {
                        group_id: 11,
                        client: None,
                        major_masters: Vec::new(),
                    },
                ],
            );
        }
        api
    }

    /// Make every call to `operation` fail with a transport error.
    pub fn fail(&self, operation: &str) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(operation.to_string());
    }

    pub fn fail_category(&self, category: Category) {
        self.state
            .lock()
            .unwrap()
            .failing_categories
            .insert(category);
    }

    pub fn set_submit_ack(&self, ack: Acknowledgement) {
        self.state.lock().unwrap().submit_ack = Some(ack);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn mappings(&self) -> Vec<(Category, MappingPayload)> {
        self.state.lock().unwrap().mappings.clone()
    }

    pub fn master_items(&self, category: Category) -> Vec<MasterItem> {
        self.state
            .lock()
            .unwrap()
            .master
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    pub fn codes(&self) -> Vec<Code> {
        self.state.lock().unwrap().codes.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == operation).count()
    }

    fn enter(&self, operation: &str) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation.to_string());
        if state.failing.contains(operation) {
            return Err(Error::transport(format!("{operation}: connection refused")));
        }
        Ok(state)
    }
}

#[async_trait]
impl MapperApi for MockApi {
    async fn list_codes(&self) -> Result<Vec<Code>> {
        Ok(self.enter("list_codes")?.codes.clone())
    }

    async fn get_code(&self, id: i64) -> Result<Code> {
        let state = self.enter("get_code")?;
        state
            .codes
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| Error::transport(format!("Error fetching code: 404 ({id})")))
    }

    async fn add_code(&self, text: &str) -> Result<()> {
        let mut state = self.enter("add_code")?;
        let id = state.codes.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        state.codes.push(code(id, text));
        Ok(())
    }

    async fn list_master_items(&self, category: Category) -> Result<Vec<MasterItem>> {
        let state = self.enter("list_master_items")?;
        Ok(state.master.get(&category).cloned().unwrap_or_default())
    }

    async fn add_master_item(&self, category: Category, text: &str) -> Result<()> {
        let mut state = self.enter("add_master_item")?;
        let list = state.master.entry(category).or_default();
        let id = list.iter().map(|i| i.id).max().unwrap_or(100) + 1;
        list.push(item(id, text));
        Ok(())
    }

    async fn delete_master_item(&self, category: Category, id: i64, _text: &str) -> Result<()> {
        let mut state = self.enter("delete_master_item")?;
        if let Some(list) = state.master.get_mut(&category) {
            list.retain(|i| i.id != id);
        }
        Ok(())
    }

    async fn list_data_for_code(
        &self,
        code_id: i64,
        category: Category,
    ) -> Result<Vec<MasterItem>> {
        let state = self.enter("list_data_for_code")?;
        if state.failing_categories.contains(&category) {
            return Err(Error::transport(format!(
                "Error fetching {category} data: 500"
            )));
        }
        Ok(state
            .code_data
            .get(&(code_id, category))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_clients(&self) -> Result<Vec<String>> {
        Ok(self.enter("list_clients")?.clients.clone())
    }

    async fn submit_selection(
        &self,
        code_id: i64,
        items: &[SelectedItem],
        client: &str,
    ) -> Result<Acknowledgement> {
        let mut state = self.enter("submit_selection")?;
        state.submissions.push(Submission {
            code_id,
            items: items.to_vec(),
            client: client.to_string(),
        });
        Ok(state
            .submit_ack
            .clone()
            .unwrap_or_else(|| Acknowledgement::ok("Group saved")))
    }

    async fn list_code_groups(&self, code_id: i64) -> Result<Vec<CodeGroup>> {
        let state = self.enter("list_code_groups")?;
        Ok(state.groups.get(&code_id).cloned().unwrap_or_default())
    }

    async fn delete_code_group(&self, code_id: i64, group_id: i64) -> Result<Acknowledgement> {
        let mut state = self.enter("delete_code_group")?;
        let groups = state.groups.entry(code_id).or_default();
        let before = groups.len();
        groups.retain(|g| g.group_id != group_id);
        if groups.len() == before {
            return Ok(Acknowledgement::failed("Group not found"));
        }
        Ok(Acknowledgement {
            success: true,
            message: None,
        })
    }

    async fn lookup_cuis(
        &self,
        item: &MasterItem,
        code: &Code,
        category: Category,
    ) -> Result<Vec<CuiDetails>> {
        self.enter("lookup_cuis")?;
        Ok(vec![CuiDetails {
            cui: format!("C{:07}", item.id),
            text: format!("{} for {}", item.text, code.code),
            cui_type: category.to_string(),
        }])
    }

    async fn lookup_text_to_cuis(
        &self,
        _category: Category,
        item: &MasterItem,
    ) -> Result<Vec<TextToCui>> {
        self.enter("lookup_text_to_cuis")?;
        Ok(vec![TextToCui {
            id: item.id,
            cui: "C0009555".into(),
            text: item.text.clone(),
            cui_type: "lab".into(),
        }])
    }

    async fn add_mapping(&self, category: Category, payload: &MappingPayload) -> Result<()> {
        let mut state = self.enter("add_mapping")?;
        state.mappings.push((category, payload.clone()));
        Ok(())
    }

    async fn get_mapping_data(
        &self,
        item: &MasterItem,
        code: &Code,
        category: Category,
    ) -> Result<Vec<MappingRow>> {
        let state = self.enter("get_mapping_data")?;
        Ok(state
            .mappings
            .iter()
            .filter(|(c, p)| {
                *c == category && p.master_data_item.id == item.id && p.code_master.id == code.id
            })
            .map(|(_, p)| MappingRow {
                code: p.code_master.code.clone(),
                code_id: p.code_master.id,
                master_id: p.master_data_item.id,
                text: p.master_data_item.text.clone(),
                unit: p.unit.clone(),
                value1: p.value1.clone(),
                value2: p.value2.clone(),
                relationship: p.relationship.map(|r| r.to_string()),
                ..MappingRow::default()
            })
            .collect())
    }

    async fn delete_mapping(
        &self,
        item: &MasterItem,
        code: &Code,
        category: Category,
    ) -> Result<String> {
        let mut state = self.enter("delete_mapping")?;
        state.mappings.retain(|(c, p)| {
            !(*c == category && p.master_data_item.id == item.id && p.code_master.id == code.id)
        });
        Ok("Mapping removed".to_string())
    }

    async fn health(&self) -> Result<String> {
        self.enter("health")?;
        Ok("Backend is up".to_string())
    }
}
