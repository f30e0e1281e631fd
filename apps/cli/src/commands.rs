//! Subcommand implementations
//!
//! Each command drives one of the core workflows against the backend and
//! prints the outcome to stdout. Free-form `--code`/`--item` arguments are
//! resolved through the same searchable selector the workflows use.

use anyhow::{anyhow, bail, Context};
use std::io::{BufRead, Write};
use std::str::FromStr;

use codemap_client::HttpMapperClient;
use codemap_core::{
    category_type_title, filter_candidates, Category, Code, CodeGroupsView, DataMappingSession,
    MapperApi, MappingForm, MappingViewer, MasterCuration, PendingDeletion, Relationship,
    SearchableSelector, Selectable, Toggle,
};

/// `CATEGORY:ITEM[@FREQUENCY]` as given to `codemap select --item`. A suffix
/// after the last `@` that is not an integer stays part of the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemArg {
    pub category: Category,
    pub item: String,
    pub frequency: Option<i64>,
}

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("expected CATEGORY:ITEM, got '{s}'"))?;
        let category = category.parse::<Category>().map_err(|e| e.to_string())?;
        // Only a numeric suffix is a frequency; '@' may appear in item text.
        let (item, frequency) = match rest.rsplit_once('@') {
            Some((item, freq)) => match freq.trim().parse::<i64>() {
                Ok(freq) => (item, Some(freq)),
                Err(_) => (rest, None),
            },
            None => (rest, None),
        };
        let item = item.trim();
        if item.is_empty() {
            return Err(format!("missing item in '{s}'"));
        }
        Ok(Self {
            category,
            item: item.to_string(),
            frequency,
        })
    }
}

/// Qualifier flags of `codemap mapping add`.
#[derive(Debug, Default)]
pub struct QualifierArgs {
    pub relationship: Option<Relationship>,
    pub value1: Option<String>,
    pub value2: Option<String>,
    pub unit: Option<String>,
    pub except_value: Option<String>,
    pub comment: Option<String>,
}

/// Yes/no confirmation for destructive commands.
pub struct Prompt {
    assume_yes: bool,
}

impl Prompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    pub fn confirm(&mut self, pending: &PendingDeletion) -> anyhow::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let stdin = std::io::stdin();
        confirm_with(&pending.prompt(), &mut stdin.lock(), &mut std::io::stderr())
    }
}

fn confirm_with(
    question: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> anyhow::Result<bool> {
    write!(output, "{question} Continue? [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Resolve `input` to exactly one candidate of `selector`.
fn pick<T: Selectable + Clone>(
    selector: &mut SearchableSelector<T>,
    input: &str,
    what: &str,
) -> anyhow::Result<T> {
    selector.resolve(input);
    if let Some(selected) = selector.selection() {
        return Ok(selected.clone());
    }
    let hits: Vec<String> = selector
        .filtered()
        .iter()
        .take(5)
        .map(|c| c.display_text().to_string())
        .collect();
    if hits.is_empty() {
        bail!("No {what} matches '{input}'");
    }
    bail!(
        "'{input}' matches more than one {what}: {}",
        hits.join(", ")
    )
}

async fn resolve_code(api: &dyn MapperApi, input: &str) -> anyhow::Result<Code> {
    let codes = api.list_codes().await?;
    pick(&mut SearchableSelector::new(codes), input, "code")
}

pub async fn health(api: &HttpMapperClient) -> anyhow::Result<()> {
    let status = api.health().await?;
    println!("{status}");
    if let Some(message) = api.service_health().await? {
        println!("{message}");
    }
    Ok(())
}

pub async fn clients(api: &dyn MapperApi) -> anyhow::Result<()> {
    for client in api.list_clients().await? {
        println!("{client}");
    }
    Ok(())
}

pub async fn list_codes(api: &dyn MapperApi, search: Option<&str>) -> anyhow::Result<()> {
    let codes = api.list_codes().await?;
    let shown = filter_candidates(&codes, search.unwrap_or(""));
    if shown.is_empty() {
        println!("No results found");
    }
    for code in shown {
        println!("{:>6}  {}", code.id, code.code);
    }
    Ok(())
}

pub async fn add_code(api: &dyn MapperApi, text: &str) -> anyhow::Result<()> {
    codemap_core::add_code(api, text).await?;
    println!("Code added: {}", text.trim());
    Ok(())
}

pub async fn show_code(api: &dyn MapperApi, input: &str) -> anyhow::Result<()> {
    let code = resolve_code(api, input).await?;
    let data = codemap_core::load_code_data(api, code.id).await?;
    println!("{} (id {})", data.code.code, data.code.id);
    for category in Category::ALL {
        let items = data.items(category);
        println!("\n{} ({})", category.title(), items.len());
        for item in items {
            println!("  {:>6}  {}", item.id, item.text);
        }
    }
    let failed = data.failed_categories();
    if !failed.is_empty() {
        let names: Vec<&str> = failed.iter().map(Category::title).collect();
        eprintln!("\nCould not load: {}", names.join(", "));
    }
    Ok(())
}

pub async fn list_master(
    api: &dyn MapperApi,
    category: Category,
    search: Option<&str>,
) -> anyhow::Result<()> {
    let mut curation = MasterCuration::new(category);
    curation.load(api).await?;
    let items = filter_candidates(curation.items.candidates(), search.unwrap_or(""));
    if items.is_empty() {
        println!("No results found");
    }
    for item in items {
        println!("{:>6}  {}", item.id, item.text);
    }
    Ok(())
}

pub async fn add_master(api: &dyn MapperApi, category: Category, text: &str) -> anyhow::Result<()> {
    let mut curation = MasterCuration::new(category);
    curation.add_item(api, text).await?;
    println!("{} item added: {}", category.title(), text.trim());
    Ok(())
}

pub async fn master_details(
    api: &dyn MapperApi,
    category: Category,
    input: &str,
) -> anyhow::Result<()> {
    let mut curation = MasterCuration::new(category);
    curation.load(api).await?;
    pick(&mut curation.items, input, category.title())?;
    let details = curation.details(api).await?;
    if details.is_empty() {
        println!("No CUIs found");
    }
    for d in details {
        println!("{}  {}  ({})", d.cui, d.text, d.cui_type);
    }
    Ok(())
}

pub async fn delete_master(
    api: &dyn MapperApi,
    prompt: &mut Prompt,
    category: Category,
    input: &str,
) -> anyhow::Result<()> {
    let mut curation = MasterCuration::new(category);
    curation.load(api).await?;
    pick(&mut curation.items, input, category.title())?;
    let pending = curation.request_delete()?;
    if !prompt.confirm(&pending)? {
        println!("Cancelled");
        return Ok(());
    }
    let message = curation.confirm_delete(api, pending).await?;
    println!("{message}");
    Ok(())
}

async fn finish_deletion(
    api: &dyn MapperApi,
    prompt: &mut Prompt,
    pending: PendingDeletion,
) -> anyhow::Result<()> {
    if !prompt.confirm(&pending)? {
        println!("Cancelled");
        return Ok(());
    }
    let message = pending.confirm(api).await?;
    println!("{message}");
    Ok(())
}

pub async fn select(
    api: &dyn MapperApi,
    code: &str,
    client: &str,
    items: &[ItemArg],
) -> anyhow::Result<()> {
    let code = resolve_code(api, code).await?;
    let mut session = DataMappingSession::open(api, code.id)
        .await
        .with_context(|| format!("Failed to load data for code {}", code.code))?;

    for arg in items {
        let candidates = session.data().items(arg.category).to_vec();
        let item = pick(
            &mut SearchableSelector::new(candidates),
            &arg.item,
            arg.category.title(),
        )?;
        if let Some(frequency) = arg.frequency {
            session
                .selection
                .counter(arg.category)
                .set(item.id, frequency);
        }
        if session.toggle(arg.category, item.id)? == Toggle::Removed {
            // listed twice, which toggles it back out
            tracing::warn!(category = %arg.category, item = %item.text, "Item given twice, deselected");
        }
    }

    session.choose_client(client).map_err(|e| {
        anyhow!(
            "{e}. Known clients: {}",
            if session.clients().is_empty() {
                "none".to_string()
            } else {
                session.clients().join(", ")
            }
        )
    })?;

    println!("Code {} for {}:", session.code().code, client);
    for group in session.selection.group_by_category() {
        println!("  {}", group.category.title());
        for item in group.items {
            println!("    {} x{}", item.text, item.frequency);
        }
    }

    let receipt = session.apply(api).await?;
    println!("{}", receipt.message);
    Ok(())
}

pub async fn list_groups(api: &dyn MapperApi, code: &str) -> anyhow::Result<()> {
    let view = open_groups(api, code).await?;
    if view.groups().is_empty() {
        println!("No groups");
    }
    for group in view.groups() {
        println!(
            "Group {} ({})",
            group.group_id,
            group.client.as_deref().unwrap_or("no client")
        );
        for row in &group.major_masters {
            println!(
                "  {:<14} {:>6}  {} x{}",
                category_type_title(&row.category_type),
                row.category_id,
                row.text.as_deref().unwrap_or(""),
                row.frequency
            );
        }
    }
    Ok(())
}

pub async fn delete_group(
    api: &dyn MapperApi,
    prompt: &mut Prompt,
    code: &str,
    group_id: i64,
) -> anyhow::Result<()> {
    let mut view = open_groups(api, code).await?;
    let pending = view.request_delete(group_id)?;
    if !prompt.confirm(&pending)? {
        println!("Cancelled");
        return Ok(());
    }
    let message = view.confirm_delete(api, pending).await?;
    println!("{message}");
    if view.is_stale() {
        println!("Could not refresh the group list");
    } else {
        println!("{} group(s) remaining", view.groups().len());
    }
    Ok(())
}

async fn open_groups(api: &dyn MapperApi, code: &str) -> anyhow::Result<CodeGroupsView> {
    let mut view = CodeGroupsView::open(api, None).await?;
    let code = pick(&mut view.codes, code, "code")?;
    view.select(api, code.id).await?;
    Ok(view)
}

fn ensure_mappable(category: Category) -> anyhow::Result<()> {
    if !Category::MAPPABLE.contains(&category) {
        bail!("{} has no code mappings", category.title());
    }
    Ok(())
}

async fn mapping_form(
    api: &dyn MapperApi,
    category: Category,
    item: &str,
    code: &str,
) -> anyhow::Result<MappingForm> {
    ensure_mappable(category)?;
    let mut form = MappingForm::new(category);
    form.load(api).await;
    pick(&mut form.items, item, category.title())?;
    pick(&mut form.codes, code, "code")?;
    Ok(form)
}

pub async fn add_mapping(
    api: &dyn MapperApi,
    category: Category,
    item: &str,
    code: &str,
    qualifiers: QualifierArgs,
) -> anyhow::Result<()> {
    let mut form = mapping_form(api, category, item, code).await?;
    if form.is_expanded() {
        let fields = form.fields_mut();
        if let Some(relationship) = qualifiers.relationship {
            fields.relationship = relationship;
        }
        fields.value1 = qualifiers.value1.unwrap_or_default();
        fields.value2 = qualifiers.value2.unwrap_or_default();
        fields.unit = qualifiers.unit.unwrap_or_default();
        fields.except_value = qualifiers.except_value.unwrap_or_default();
        fields.comment = qualifiers.comment.unwrap_or_default();
    } else if qualifiers.relationship.is_some() || qualifiers.value1.is_some() {
        tracing::warn!(%category, "Qualifiers are ignored for this category");
    }
    form.submit(api).await?;
    println!("Mapping added");
    Ok(())
}

async fn mapping_viewer(
    api: &dyn MapperApi,
    category: Category,
    item: &str,
    code: &str,
) -> anyhow::Result<MappingViewer> {
    ensure_mappable(category)?;
    let mut viewer = MappingViewer::new(category);
    viewer.load(api).await;
    pick(&mut viewer.items, item, category.title())?;
    pick(&mut viewer.codes, code, "code")?;
    Ok(viewer)
}

pub async fn show_mapping(
    api: &dyn MapperApi,
    category: Category,
    item: &str,
    code: &str,
) -> anyhow::Result<()> {
    let mut viewer = mapping_viewer(api, category, item, code).await?;
    let qualifiers = viewer.shows_qualifier_columns();
    let rows = viewer.view(api).await?;
    if rows.is_empty() {
        println!("No mapping found");
    }
    for row in rows {
        print!("{}  {}  {}  {}", row.code, row.cui, row.text, row.cui_type);
        if qualifiers {
            print!(
                "  {} {} {} {}",
                row.relationship.as_deref().unwrap_or("-"),
                row.value1.as_deref().unwrap_or("-"),
                row.value2.as_deref().unwrap_or("-"),
                row.unit.as_deref().unwrap_or("-"),
            );
        }
        println!();
    }
    Ok(())
}

pub async fn delete_mapping(
    api: &dyn MapperApi,
    prompt: &mut Prompt,
    category: Category,
    item: &str,
    code: &str,
) -> anyhow::Result<()> {
    let viewer = mapping_viewer(api, category, item, code).await?;
    let pending = viewer.request_delete()?;
    finish_deletion(api, prompt, pending).await
}

pub async fn mapping_cuis(
    api: &dyn MapperApi,
    category: Category,
    item: &str,
    code: &str,
) -> anyhow::Result<()> {
    let form = mapping_form(api, category, item, code).await?;
    let cuis = form.fetch_cuis(api).await?;
    if cuis.is_empty() {
        println!("No CUIs found");
    }
    for cui in cuis {
        println!("{}  {}  ({})", cui.cui, cui.text, cui.cui_type);
    }
    Ok(())
}
