use std::fmt;

use crate::column::ColumnDescriptor;
use crate::record::Record;
use crate::store::{Fee, Role, SchoolStore, Session, Student, Teacher};
use crate::value::{ColumnKind, Value};

/// Tables of the school store that can be opened in a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Students,
    Teachers,
    Fees,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Students, Dataset::Teachers, Dataset::Fees];

    pub fn visible_for(role: Role) -> Vec<Dataset> {
        match role {
            Role::Student => vec![Dataset::Fees],
            Role::Teacher => vec![Dataset::Students],
            Role::Admin | Role::SuperAdmin => Self::ALL.to_vec(),
        }
    }

    pub fn columns(self) -> Vec<ColumnDescriptor> {
        match self {
            Dataset::Students => vec![
                ColumnDescriptor::text("admission_no", "Adm. No").sortable(true),
                ColumnDescriptor::text("first_name", "Name").with_render(|r| {
                    format!(
                        "{} {}",
                        ColumnKind::Text.display(r.get("first_name")),
                        ColumnKind::Text.display(r.get("surname"))
                    )
                }),
                ColumnDescriptor::text("surname", "Surname").sortable(true),
                ColumnDescriptor::text("class", "Class")
                    .sortable(true)
                    .filterable(true),
                ColumnDescriptor::text("gender", "Gender").filterable(true),
                ColumnDescriptor::text("guardian", "Guardian"),
                ColumnDescriptor::enumeration("status", "Status", ["active", "pending", "inactive"])
                    .sortable(true)
                    .filterable(true),
                ColumnDescriptor::date("admitted", "Admitted").sortable(true),
            ],
            Dataset::Teachers => vec![
                ColumnDescriptor::text("name", "Name").sortable(true),
                ColumnDescriptor::text("subject", "Subject")
                    .sortable(true)
                    .filterable(true),
                ColumnDescriptor::text("email", "Email"),
                ColumnDescriptor::text("phone", "Phone"),
                ColumnDescriptor::enumeration("status", "Status", ["active", "on leave", "inactive"])
                    .filterable(true),
            ],
            Dataset::Fees => vec![
                ColumnDescriptor::text("student", "Student").sortable(true),
                ColumnDescriptor::text("class", "Class").filterable(true),
                ColumnDescriptor::text("term", "Term").filterable(true),
                ColumnDescriptor::text("description", "Item"),
                ColumnDescriptor::number("amount", "Amount").sortable(true),
                ColumnDescriptor::number("paid", "Paid").sortable(true),
                ColumnDescriptor::number("balance", "Balance").sortable(true),
                ColumnDescriptor::enumeration("status", "Status", ["pending", "partial", "paid"])
                    .sortable(true)
                    .filterable(true),
                ColumnDescriptor::date("due", "Due").sortable(true),
            ],
        }
    }

    /// Rows of this dataset the session is allowed to see.
    pub fn records(self, store: &SchoolStore, session: &Session) -> Vec<Record> {
        match self {
            Dataset::Students => store.students().iter().map(student_record).collect(),
            Dataset::Teachers => store.teachers().iter().map(teacher_record).collect(),
            Dataset::Fees => store
                .fees()
                .iter()
                .filter(|f| session.role != Role::Student || session.linked_id == Some(f.student_id))
                .map(|f| fee_record(f, store.student(f.student_id)))
                .collect(),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dataset::Students => "Students",
            Dataset::Teachers => "Teachers",
            Dataset::Fees => "Fees",
        };
        f.write_str(name)
    }
}

fn student_record(s: &Student) -> Record {
    Record::new()
        .with("id", s.id)
        .with("admission_no", s.admission_no.as_str())
        .with("first_name", s.first_name.as_str())
        .with("surname", s.surname.as_str())
        .with("class", s.class.as_str())
        .with("gender", s.gender.as_str())
        .with("guardian", s.guardian.clone())
        .with("status", Value::Enum(s.status.clone()))
        .with("admitted", s.admitted)
}

fn teacher_record(t: &Teacher) -> Record {
    Record::new()
        .with("id", t.id)
        .with("name", t.name.as_str())
        .with("subject", t.subject.as_str())
        .with("email", t.email.as_str())
        .with("phone", t.phone.clone())
        .with("status", Value::Enum(t.status.clone()))
}

fn fee_record(f: &Fee, student: Option<&Student>) -> Record {
    Record::new()
        .with("id", f.id)
        .with(
            "student",
            student.map(|s| format!("{} {}", s.first_name, s.surname)),
        )
        .with("class", student.map(|s| s.class.clone()))
        .with("term", f.term.as_str())
        .with("description", f.description.as_str())
        .with("amount", f.amount)
        .with("paid", f.paid)
        .with("balance", f.balance())
        .with("status", Value::Enum(f.status().to_string()))
        .with("due", f.due)
}
