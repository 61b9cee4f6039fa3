use crate::domain::directory::{Employee, Hotel, Role};
use crate::error::{Result, WorkflowError};
use serde::de::DeserializeOwned;
use std::io::Read;

fn records<R: Read, T: DeserializeOwned>(source: R) -> impl Iterator<Item = Result<T>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source)
        .into_deserialize()
        .map(|result| result.map_err(WorkflowError::from))
}

/// Reads directory employees from CSV with the header
/// `id,name,company,email,role`. Empty `email` and `role` cells fall back to
/// no email and the traveler role.
pub struct EmployeeReader<R: Read> {
    source: R,
}

impl<R: Read> EmployeeReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn employees(self) -> impl Iterator<Item = Result<Employee>> {
        records::<R, EmployeeRow>(self.source).map(|row| row.map(Employee::from))
    }
}

#[derive(serde::Deserialize)]
struct EmployeeRow {
    id: String,
    name: String,
    company: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        let role = match row.role.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("approver") => Role::Approver,
            Some("agent") => Role::Agent,
            _ => Role::Traveler,
        };
        Self {
            id: row.id,
            name: row.name,
            company: row.company,
            email: row.email.filter(|e| !e.is_empty()),
            role,
        }
    }
}

/// Reads catalog hotels from CSV with the header `id,name,city_code`.
pub struct HotelReader<R: Read> {
    source: R,
}

impl<R: Read> HotelReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn hotels(self) -> impl Iterator<Item = Result<Hotel>> {
        records::<R, Hotel>(self.source).map(|hotel| {
            hotel.map(|h| Hotel {
                city_code: h.city_code.filter(|c| !c.is_empty()),
                ..h
            })
        })
    }
}
