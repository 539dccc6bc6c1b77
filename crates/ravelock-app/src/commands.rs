//! Command implementations over a document [`Storage`].
//!
//! Each command loads the canvas it names, applies one operation and saves
//! it again. The returned text is what the binary prints.

use log::{debug, info};
use pollster::block_on;
use ravelock_core::lock::border_shade;
use ravelock_core::{
    CanvasDocument, GroupId, LockPeer, LockPolicy, Ravel, RavelId, RavelLockGroup, Storage,
};
use uuid::Uuid;

use crate::cli::{Command, PolicyField};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Run one command.
pub fn run(command: Command, storage: &dyn Storage, config: &AppConfig) -> AppResult<String> {
    debug!("running {:?}", command);
    match command {
        Command::New { name } => {
            let mut doc = CanvasDocument::new();
            doc.name = name;
            doc.default_policy = config.default_policy.unwrap_or_default();
            block_on(storage.save(&doc))?;
            Ok(format!("created canvas {}", doc.id))
        }
        Command::Demo => {
            let doc = demo_canvas(config.default_policy.unwrap_or_default())?;
            block_on(storage.save(&doc))?;
            info!("created demo canvas {}", doc.id);
            Ok(format!("created canvas {}", doc.id))
        }
        Command::List => Ok(block_on(storage.list())?.join("\n")),
        Command::Show { canvas } => Ok(describe(&block_on(storage.load(&canvas))?)),
        Command::AddRavel {
            canvas,
            tooltip,
            handles,
        } => {
            let mut doc = block_on(storage.load(&canvas))?;
            let mut ravel = Ravel::new().with_tooltip(tooltip.as_str());
            for spec in &handles {
                let (name, labels) = parse_handle(spec)?;
                ravel.add_handle(&name, labels)?;
            }
            let id = doc.add_ravel(ravel);
            block_on(storage.save(&doc))?;
            Ok(format!("added ravel {} ({})", tooltip, id))
        }
        Command::Lock { canvas, ravels } => {
            let mut doc = block_on(storage.load(&canvas))?;
            let ids = ravels
                .iter()
                .map(|r| resolve_ravel(&doc, r))
                .collect::<AppResult<Vec<_>>>()?;
            if let Some(policy) = config.default_policy {
                doc.default_policy = policy;
            }
            let group = doc.lock_ravels(&ids)?;
            let summary = describe_group(&doc, group);
            block_on(storage.save(&doc))?;
            Ok(summary)
        }
        Command::Unlock { canvas, ravel } => {
            let mut doc = block_on(storage.load(&canvas))?;
            let id = resolve_ravel(&doc, &ravel)?;
            if !doc.leave_lock_group(id) {
                return Err(AppError::NotLocked(ravel));
            }
            block_on(storage.save(&doc))?;
            Ok(format!("unlocked {}", ravel))
        }
        Command::LockHandles {
            canvas,
            ravel,
            handles,
            all,
        } => {
            let mut doc = block_on(storage.load(&canvas))?;
            let group = group_of(&doc, &ravel)?;
            if let Some(policy) = config.default_policy {
                doc.set_group_policy(group, policy)?;
            }
            let handles = if all { doc.all_lock_handles(group)? } else { handles };
            doc.set_lock_handles(group, handles.as_slice())?;
            let summary = describe_group(&doc, group);
            block_on(storage.save(&doc))?;
            Ok(summary)
        }
        Command::Policy {
            canvas,
            ravel,
            row,
            fields,
        } => {
            let mut doc = block_on(storage.load(&canvas))?;
            let group = group_of(&doc, &ravel)?;
            doc.set_row_policy(group, row, PolicyField::policy(&fields))?;
            let summary = describe_group(&doc, group);
            block_on(storage.save(&doc))?;
            Ok(summary)
        }
        Command::Slice {
            canvas,
            ravel,
            handle,
            step,
        } => {
            let mut doc = block_on(storage.load(&canvas))?;
            let id = resolve_ravel(&doc, &ravel)?;
            doc.adjust_slicer(id, &handle, step)?;
            let summary = describe(&doc);
            block_on(storage.save(&doc))?;
            Ok(summary)
        }
        Command::Sort {
            canvas,
            ravel,
            handle,
            order,
        } => {
            let mut doc = block_on(storage.load(&canvas))?;
            let id = resolve_ravel(&doc, &ravel)?;
            doc.edit_ravel(id, |r| r.set_sort_order(&handle, order.into()))?;
            let summary = describe(&doc);
            block_on(storage.save(&doc))?;
            Ok(summary)
        }
    }
}

/// Three ravels over a sales cube, locked together.
pub fn demo_canvas(policy: LockPolicy) -> AppResult<CanvasDocument> {
    let mut doc = CanvasDocument::new();
    doc.name = "Demo".to_string();
    doc.default_policy = policy;

    let quarters = ["Q1", "Q2", "Q3", "Q4"];
    let sales = Ravel::new()
        .with_tooltip("sales")
        .with_handle("time", quarters)?
        .with_handle("region", ["north", "south", "east", "west"])?
        .with_handle("product", ["widgets", "gadgets"])?;
    let costs = Ravel::new()
        .with_tooltip("costs")
        .with_handle("time", quarters)?
        .with_handle("region", ["north", "south", "east", "west"])?;
    let forecast = Ravel::new()
        .with_tooltip("forecast")
        .with_handle("time", quarters)?
        .with_handle("scenario", ["low", "mid", "high"])?;

    let ids = [sales, costs, forecast].map(|r| doc.add_ravel(r));
    doc.lock_ravels(&ids)?;
    Ok(doc)
}

/// Split `name=label,label,...`.
fn parse_handle(spec: &str) -> AppResult<(String, Vec<String>)> {
    let invalid = || AppError::InvalidHandleSpec(spec.to_string());
    let (name, labels) = spec.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid());
    }
    let labels = labels
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    Ok((name.to_string(), labels))
}

/// Find a ravel by id, or else by tooltip.
fn resolve_ravel(doc: &CanvasDocument, key: &str) -> AppResult<RavelId> {
    if let Ok(id) = Uuid::parse_str(key) {
        if doc.ravel(id).is_some() {
            return Ok(id);
        }
    }
    doc.ravels_ordered()
        .find(|r| r.tooltip == key)
        .map(Ravel::id)
        .ok_or_else(|| AppError::UnknownRavel(key.to_string()))
}

fn group_of(doc: &CanvasDocument, ravel: &str) -> AppResult<GroupId> {
    let id = resolve_ravel(doc, ravel)?;
    doc.lock_group_of(id)
        .map(RavelLockGroup::id)
        .ok_or_else(|| AppError::NotLocked(ravel.to_string()))
}

fn policy_flags(policy: LockPolicy) -> String {
    let flags: Vec<&str> = [
        (policy.slicer, "slicer"),
        (policy.orientation, "orientation"),
        (policy.calipers, "calipers"),
        (policy.order, "order"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    if flags.is_empty() { "-".to_string() } else { flags.join(" ") }
}

fn describe_group(doc: &CanvasDocument, group: GroupId) -> String {
    let Some(lock_group) = doc.lock_group(group) else {
        return format!("group {} no longer exists", group);
    };
    let shade = border_shade(lock_group.colour(), false).to_rgba8();
    let mut lines = vec![format!(
        "group {} [colour {}, border #{:02x}{:02x}{:02x}{:02x}]: {}",
        group,
        lock_group.colour(),
        shade.r,
        shade.g,
        shade.b,
        shade.a,
        lock_group.ravel_names(&doc.ravels).join(", ")
    )];
    if lock_group.lock_info().is_empty() {
        lines.push("  locks the whole state".to_string());
    }
    for (i, row) in lock_group.lock_info().rows().iter().enumerate() {
        let names: Vec<&str> = (0..row.handle_names.len())
            .map(|slot| row.name(slot).unwrap_or("-"))
            .collect();
        lines.push(format!(
            "  row {} [{}]: {}",
            i,
            policy_flags(row.policy),
            names.join(" | ")
        ));
    }
    lines.join("\n")
}

fn describe(doc: &CanvasDocument) -> String {
    let mut lines = vec![format!("canvas {} ({})", doc.name, doc.id)];
    for ravel in doc.ravels_ordered() {
        let handles: Vec<String> = ravel
            .state()
            .handle_states
            .iter()
            .map(|hs| format!("{}={}", hs.description, hs.slice_label))
            .collect();
        let group = doc
            .lock_group_of(ravel.id())
            .map(|g| format!(" [group {}]", g.colour()))
            .unwrap_or_default();
        lines.push(format!("  {}{}: {}", ravel.tooltip, group, handles.join(" ")));
    }
    let mut groups: Vec<&RavelLockGroup> = doc.lock_groups.values().collect();
    groups.sort_by_key(|g| g.colour());
    lines.extend(groups.into_iter().map(|g| describe_group(doc, g.id())));
    lines.join("\n")
}
