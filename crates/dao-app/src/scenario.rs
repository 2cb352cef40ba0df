//! Employee lifecycle run by the binary
//!
//! create → count → find → duplicate create → update → delete, checking
//! each step against the expected outcome. The run only touches the
//! employee it creates and refuses to start if that id is already taken.

use anyhow::{bail, ensure, Context};
use dao_domain::{DocumentStore, Employee};
use dao_usecase::EmployeeService;
use tracing::info;

/// Index sizes seen by one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioReport {
    pub count_before: u64,
    pub count_after: u64,
}

pub fn run<S: DocumentStore>(index: &str, store: S) -> anyhow::Result<ScenarioReport> {
    let service =
        EmployeeService::new(index, store).context("Failed to open employee repository")?;

    let count_before = service.count()?;
    info!(count = count_before, "📋 Index opened");

    let alice = Employee::new(1, "Alice", 30);
    if service.exists(alice.id())? {
        bail!(
            "employee {} already exists in index '{}'; refusing to overwrite it",
            alice.id(),
            index
        );
    }

    service.create(alice.clone())?;
    let count = service.count()?;
    ensure!(
        count == count_before + 1,
        "count after create is {}, expected {}",
        count,
        count_before + 1
    );
    info!(id = %alice.id(), count, "✓ Created employee");

    let found = service.find_by_id(alice.id())?;
    ensure!(found.as_ref() == Some(&alice), "read back {:?}, expected {:?}", found, alice);
    info!(employee = ?found, "✓ Found employee");

    match service.create(alice.clone()) {
        Err(e) if e.is_duplicate_key() => info!(error = %e, "✓ Duplicate create rejected"),
        Err(e) => return Err(e.into()),
        Ok(_) => bail!("duplicate create of {} was accepted", alice.id()),
    }

    let alicia = alice.clone().with_name("Alicia").with_age(31);
    ensure!(service.update(&alicia)?, "update of {} reported no change", alicia.id());
    let found = service.find_by_id(alicia.id())?;
    ensure!(found.as_ref() == Some(&alicia), "read back {:?} after update", found);
    info!(employee = ?found, "✓ Updated employee");

    ensure!(service.delete_by_id(alicia.id())?, "delete of {} removed nothing", alicia.id());
    ensure!(!service.exists(alicia.id())?, "{} still exists after delete", alicia.id());
    let count_after = service.count()?;
    ensure!(
        count_after == count_before,
        "count after delete is {}, expected {}",
        count_after,
        count_before
    );
    info!(count = count_after, "✓ Deleted employee");

    Ok(ScenarioReport {
        count_before,
        count_after,
    })
}
