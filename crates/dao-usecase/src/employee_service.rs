//! Employee Service - Typed persistence facade for Employees
//!
//! Translates repository write codes into the boolean / entity results
//! callers work with.

use dao_domain::{DocumentStore, Employee, EmployeeId, EmployeeMapper, WriteResult};
use tracing::debug;

use crate::error::Result;
use crate::repository::GenericRepository;

/// Employee Service
#[derive(Debug)]
pub struct EmployeeService<S> {
    repository: GenericRepository<EmployeeMapper, S>,
}

impl<S: DocumentStore> EmployeeService<S> {
    /// Create the service over `index`, creating the index if needed
    pub fn new(index: impl Into<String>, store: S) -> Result<Self> {
        Ok(Self {
            repository: GenericRepository::new(EmployeeMapper, index, store)?,
        })
    }

    pub fn from_repository(repository: GenericRepository<EmployeeMapper, S>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &GenericRepository<EmployeeMapper, S> {
        &self.repository
    }

    /// Find an employee by primary key
    pub fn find_by_id(&self, id: impl Into<EmployeeId>) -> Result<Option<Employee>> {
        self.repository.select(&Employee::key_only(id))
    }

    /// Find all employees
    pub fn find_all(&self) -> Result<Vec<Employee>> {
        self.repository.select_all()
    }

    /// Load the stored version of `employee`, looked up by its primary key
    pub fn load(&self, employee: &Employee) -> Result<Option<Employee>> {
        self.repository.select(employee)
    }

    /// Insert; true if the engine reports the document as created
    pub fn insert(&self, employee: &Employee) -> Result<bool> {
        let result = self.repository.insert(employee)?;
        Ok(result == WriteResult::Created)
    }

    /// Create or update
    ///
    /// Not atomic: another writer may create or delete the document between
    /// the existence check and the write. A concurrent create surfaces as
    /// [`RepositoryError::DuplicateKey`](crate::RepositoryError::DuplicateKey);
    /// a concurrent delete makes the update a no-op.
    pub fn save(&self, employee: Employee) -> Result<Employee> {
        if self.repository.exists(&employee)? {
            debug!(id = %employee.id(), "save: updating existing employee");
            self.repository.update(&employee)?;
        } else {
            debug!(id = %employee.id(), "save: inserting new employee");
            self.insert(&employee)?;
        }
        Ok(employee)
    }

    /// Update; true only if exactly one document changed
    pub fn update(&self, employee: &Employee) -> Result<bool> {
        let result = self.repository.update(employee)?;
        Ok(result.affected() == 1)
    }

    /// Insert, failing with `DuplicateKey` if the id is taken
    pub fn create(&self, employee: Employee) -> Result<Employee> {
        self.insert(&employee)?;
        Ok(employee)
    }

    /// Delete by primary key; true if a document was removed
    pub fn delete_by_id(&self, id: impl Into<EmployeeId>) -> Result<bool> {
        self.delete(&Employee::key_only(id))
    }

    /// Delete using the primary key carried by `employee`
    pub fn delete(&self, employee: &Employee) -> Result<bool> {
        let result = self.repository.delete(employee)?;
        Ok(result.affected() > 0)
    }

    pub fn exists(&self, id: impl Into<EmployeeId>) -> Result<bool> {
        self.repository.exists(&Employee::key_only(id))
    }

    pub fn exists_entity(&self, employee: &Employee) -> Result<bool> {
        self.repository.exists(employee)
    }

    /// Count all employees in the index
    pub fn count(&self) -> Result<u64> {
        self.repository.count_all()
    }
}
