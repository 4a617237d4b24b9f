mod host;
mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::executor::block_on;
use workviews::{
    compare_titles, decode_state_or_default, encode_state, Document, OpenEditor, PersistedState,
    SystemClock, Workview, WorkviewId, WorkviewStore,
};
use workviews_settings::{StateFile, WorkviewsPreferences};

use crate::host::HeadlessHost;

#[derive(Parser)]
#[command(
    name = "workviews-cli",
    about = "Inspect and drive saved editor layouts (workviews)",
    author,
    version
)]
struct Cli {
    /// 已編碼狀態所在的檔案。 / File holding the encoded workviews state.
    #[arg(long, global = true, value_name = "FILE", default_value = "workviews.state")]
    state: PathBuf,
    /// 偏好設定 JSON；缺少時使用預設值。 / Preferences JSON; defaults apply when absent.
    #[arg(long, global = true, value_name = "FILE")]
    preferences: Option<PathBuf>,
    /// 提高記錄詳細程度（可重複）。 / Increase log verbosity (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 依名稱列出工作檢視。 / List workviews by name.
    List,
    /// 顯示單一工作檢視的編輯器與文件。 / Show editors and documents of one workview.
    Show(TargetArgs),
    /// 建立並啟用新的工作檢視。 / Start and activate a new workview.
    Start(StartArgs),
    /// 還原工作檢視並輸出開啟順序。 / Restore a workview, printing the open sequence.
    Restore(RestoreArgs),
    /// 重新命名。 / Rename a workview.
    Rename(RenameArgs),
    /// 刪除工作檢視。 / Delete a workview.
    Delete(TargetArgs),
    /// 在作用中的工作檢視釘選文件。 / Pin a document in the active workview.
    Pin(PinArgs),
    /// 取消釘選。 / Unpin a document from the active workview.
    Unpin(UriArgs),
    /// 從作用中的工作檢視移除編輯器。 / Remove an editor from the active workview.
    Remove(UriArgs),
    /// 輸出解碼後的狀態 JSON。 / Print the decoded state as JSON.
    Decode,
    /// 將狀態 JSON 編碼寫入狀態檔。 / Encode a JSON state into the state file.
    Encode(EncodeArgs),
}

#[derive(Args)]
struct TargetArgs {
    /// 工作檢視 ID 或名稱。 / Workview id or name.
    #[arg(value_name = "WORKVIEW")]
    workview: String,
}

#[derive(Args)]
struct OpenArgs {
    /// 目前開啟的編輯器，格式為 URI[@COLUMN]。 / Editors currently open, as URI[@COLUMN].
    #[arg(long = "open", value_name = "URI[@COLUMN]", value_parser = parse_open_editor)]
    open: Vec<OpenEditor>,
}

#[derive(Args)]
struct StartArgs {
    #[arg(value_name = "NAME")]
    name: String,
    #[command(flatten)]
    open: OpenArgs,
}

#[derive(Args)]
struct RestoreArgs {
    #[arg(value_name = "WORKVIEW")]
    workview: String,
    #[command(flatten)]
    open: OpenArgs,
}

#[derive(Args)]
struct RenameArgs {
    #[arg(value_name = "WORKVIEW")]
    workview: String,
    #[arg(value_name = "NAME")]
    name: String,
}

#[derive(Args)]
struct PinArgs {
    #[arg(value_name = "URI")]
    uri: String,
    /// 最後所在欄位。 / Last known column.
    #[arg(long, value_name = "N")]
    column: Option<u32>,
}

#[derive(Args)]
struct UriArgs {
    #[arg(value_name = "URI")]
    uri: String,
}

#[derive(Args)]
struct EncodeArgs {
    /// 狀態 JSON 檔案。 / JSON state file.
    #[arg(value_name = "JSON_FILE")]
    input: PathBuf,
}

fn parse_open_editor(value: &str) -> Result<OpenEditor, String> {
    if value.trim().is_empty() {
        return Err("editor uri must not be empty".to_string());
    }
    match value.rsplit_once('@') {
        Some((uri, column)) if !uri.is_empty() => match column.parse::<u32>() {
            Ok(column) if column > 0 => Ok(OpenEditor::new(uri, Some(column))),
            Ok(_) => Err(format!("column must be positive in `{value}`")),
            Err(_) => Ok(OpenEditor::new(value, None)),
        },
        _ => Ok(OpenEditor::new(value, None)),
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let slot = StateFile::new(&cli.state);
    match cli.command {
        Commands::Decode => execute_decode(&slot),
        Commands::Encode(args) => execute_encode(&slot, &args.input),
        command => {
            let preferences = match &cli.preferences {
                Some(path) => WorkviewsPreferences::load(path).with_context(|| {
                    format!("failed to load preferences from {}", path.display())
                })?,
                None => WorkviewsPreferences::default(),
            };
            let store = WorkviewStore::load_with(
                HeadlessHost::new(slot),
                preferences,
                Rc::new(SystemClock),
            );
            execute_store_command(store, command)
        }
    }
}

fn execute_store_command(mut store: WorkviewStore<HeadlessHost>, command: Commands) -> Result<()> {
    match command {
        Commands::List => execute_list(&store),
        Commands::Show(args) => execute_show(&store, &args.workview),
        Commands::Start(args) => {
            store.host_mut().set_open_editors(args.open.open);
            let id = block_on(store.start_new_workview(&args.name))?;
            println!("started {} ({id})", args.name.trim());
            Ok(())
        }
        Commands::Restore(args) => {
            let id = resolve_id(&store, &args.workview)?;
            store.host_mut().set_open_editors(args.open.open);
            block_on(store.restore_workview(&id))?;
            Ok(())
        }
        Commands::Rename(args) => {
            let id = resolve_id(&store, &args.workview)?;
            block_on(store.rename_workview(&id, &args.name))?;
            println!("renamed {id}");
            Ok(())
        }
        Commands::Delete(args) => {
            let id = resolve_id(&store, &args.workview)?;
            block_on(store.delete_workview(&id))?;
            println!("deleted {id}");
            Ok(())
        }
        Commands::Pin(args) => {
            require_active(&store)?;
            let changed = block_on(store.pin_document(Document::new(&args.uri, args.column)))?;
            println!("{}", if changed { "pinned" } else { "already pinned" });
            Ok(())
        }
        Commands::Unpin(args) => {
            require_active(&store)?;
            let changed = block_on(store.unpin_document(&args.uri))?;
            println!("{}", if changed { "unpinned" } else { "not pinned" });
            Ok(())
        }
        Commands::Remove(args) => {
            require_active(&store)?;
            let changed = block_on(store.remove_editor(&args.uri))?;
            println!("{}", if changed { "removed" } else { "not present" });
            Ok(())
        }
        Commands::Decode => execute_decode(store.host().slot()),
        Commands::Encode(args) => execute_encode(store.host().slot(), &args.input),
    }
}

fn resolve_id(store: &WorkviewStore<HeadlessHost>, reference: &str) -> Result<WorkviewId> {
    store
        .resolve(reference)
        .map(|workview| workview.id().clone())
        .ok_or_else(|| anyhow!("no workview named or identified by `{reference}`"))
}

fn require_active(store: &WorkviewStore<HeadlessHost>) -> Result<()> {
    if store.active_workview().is_none() {
        bail!("no active workview");
    }
    Ok(())
}

fn execute_list(store: &WorkviewStore<HeadlessHost>) -> Result<()> {
    let mut workviews: Vec<&Workview> = store.workviews().iter().collect();
    workviews.sort_by(|a, b| {
        compare_titles(a.name(), b.name()).then_with(|| a.id().cmp(b.id()))
    });
    let active = store.active_workview_id();
    for workview in workviews {
        let marker = if active == Some(workview.id()) { '*' } else { ' ' };
        println!(
            "{marker} {}\t{}\t{} editors",
            workview.name(),
            workview.id(),
            workview.editor_count()
        );
    }
    Ok(())
}

fn execute_show(store: &WorkviewStore<HeadlessHost>, reference: &str) -> Result<()> {
    let workview = store
        .resolve(reference)
        .ok_or_else(|| anyhow!("no workview named or identified by `{reference}`"))?;
    println!("{}\t{}", workview.name(), workview.id());
    for editor in workview.editors() {
        println!(
            "editor\t{}\t{}\t{}",
            editor.uri,
            column_label(editor.view_column),
            if editor.is_visible() { "visible" } else { "hidden" }
        );
    }
    for listed in workview.listed_documents() {
        println!(
            "document\t{}\t{}{}",
            listed.document.uri,
            column_label(listed.document.last_view_column),
            if listed.pinned { "\tpinned" } else { "" }
        );
    }
    Ok(())
}

fn column_label(column: Option<u32>) -> String {
    column.map_or_else(|| "-".to_string(), |c| c.to_string())
}

fn execute_decode(slot: &StateFile) -> Result<()> {
    let blob = slot
        .read()
        .with_context(|| format!("failed to read {}", slot.path().display()))?;
    let state = decode_state_or_default(blob.as_deref());
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn execute_encode(slot: &StateFile, input: &Path) -> Result<()> {
    let contents = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let state: PersistedState = serde_json::from_str(&contents)
        .with_context(|| format!("invalid workviews JSON in {}", input.display()))?;
    let blob = encode_state(&state)?;
    slot.write(&blob)
        .with_context(|| format!("failed to write {}", slot.path().display()))?;
    println!("encoded {} workviews", state.workviews.len());
    Ok(())
}
