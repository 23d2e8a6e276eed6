//! In-memory school data. Constructed once and handed to whoever needs it.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: u32 },
    #[error("payment amount must be positive, got {0}")]
    InvalidAmount(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Teacher,
    Admin,
    SuperAdmin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub display_name: String,
    /// Student or teacher id the account belongs to.
    pub linked_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub email: String,
    pub role: Role,
    pub display_name: String,
    pub linked_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: u32,
    pub admission_no: String,
    pub first_name: String,
    pub surname: String,
    pub class: String,
    pub gender: String,
    pub guardian: Option<String>,
    pub status: String,
    pub admitted: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Teacher {
    pub id: u32,
    pub name: String,
    pub subject: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fee {
    pub id: u32,
    pub student_id: u32,
    pub term: String,
    pub description: String,
    pub amount: f64,
    pub paid: f64,
    pub due: NaiveDate,
}

impl Fee {
    pub fn balance(&self) -> f64 {
        (self.amount - self.paid).max(0.0)
    }

    pub fn status(&self) -> &'static str {
        if self.paid >= self.amount {
            "paid"
        } else if self.paid > 0.0 {
            "partial"
        } else {
            "pending"
        }
    }
}

#[derive(Debug, Default)]
pub struct SchoolStore {
    accounts: Vec<Account>,
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    fees: Vec<Fee>,
    next_id: u32,
}

impl SchoolStore {
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email) && a.password == password)
            .ok_or_else(|| {
                warn!("Failed login for {email}");
                StoreError::InvalidCredentials
            })?;
        info!("Logged in {} as {:?}", account.email, account.role);
        Ok(Session {
            email: account.email.clone(),
            role: account.role,
            display_name: account.display_name.clone(),
            linked_id: account.linked_id,
        })
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn fees(&self) -> &[Fee] {
        &self.fees
    }

    pub fn student(&self, id: u32) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn add_account(&mut self, account: Account) {
        self.accounts.push(account);
    }

    /// The id field of `student` is replaced by a fresh one.
    pub fn add_student(&mut self, mut student: Student) -> u32 {
        student.id = self.allocate_id();
        debug!("Adding student {} {}", student.id, student.surname);
        let id = student.id;
        self.students.push(student);
        id
    }

    pub fn update_student<F>(&mut self, id: u32, update: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Student),
    {
        let student = self
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound { kind: "student", id })?;
        update(student);
        student.id = id;
        Ok(())
    }

    /// Removes the student together with their fees.
    pub fn remove_student(&mut self, id: u32) -> Result<Student, StoreError> {
        let idx = self
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or(StoreError::NotFound { kind: "student", id })?;
        self.fees.retain(|f| f.student_id != id);
        debug!("Removed student {id}");
        Ok(self.students.remove(idx))
    }

    pub fn add_teacher(&mut self, mut teacher: Teacher) -> u32 {
        teacher.id = self.allocate_id();
        let id = teacher.id;
        self.teachers.push(teacher);
        id
    }

    pub fn remove_teacher(&mut self, id: u32) -> Result<Teacher, StoreError> {
        let idx = self
            .teachers
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound { kind: "teacher", id })?;
        Ok(self.teachers.remove(idx))
    }

    pub fn add_fee(&mut self, mut fee: Fee) -> Result<u32, StoreError> {
        if self.student(fee.student_id).is_none() {
            return Err(StoreError::NotFound {
                kind: "student",
                id: fee.student_id,
            });
        }
        fee.id = self.allocate_id();
        let id = fee.id;
        self.fees.push(fee);
        Ok(id)
    }

    /// Adds `amount` to what was paid on a fee. Returns the remaining balance.
    pub fn record_payment(&mut self, fee_id: u32, amount: f64) -> Result<f64, StoreError> {
        if amount.is_nan() || amount <= 0.0 {
            return Err(StoreError::InvalidAmount(amount));
        }
        let fee = self
            .fees
            .iter_mut()
            .find(|f| f.id == fee_id)
            .ok_or(StoreError::NotFound {
                kind: "fee",
                id: fee_id,
            })?;
        fee.paid = (fee.paid + amount).min(fee.amount);
        debug!("Payment of {amount} on fee {fee_id}, status {}", fee.status());
        Ok(fee.balance())
    }

    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// The demo school.
    pub fn seeded() -> Self {
        let mut store = SchoolStore::default();
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();

        let students = [
            ("Chinedu", "Okafor", "JSS 1A", "M", Some("Mr. Okafor"), "active"),
            ("Aisha", "Bello", "JSS 1A", "F", Some("Mrs. Bello"), "active"),
            ("Tunde", "Adeyemi", "JSS 1A", "M", None, "active"),
            ("Ngozi", "Eze", "JSS 1A", "F", Some("Dr. Eze"), "active"),
            ("Emeka", "Nwosu", "JSS 1A", "M", Some("Mrs. Nwosu"), "active"),
            ("Fatima", "Ibrahim", "JSS 2A", "F", Some("Alhaji Ibrahim"), "pending"),
            ("Segun", "Ogunleye", "JSS 2A", "M", Some("Mr. Ogunleye"), "active"),
            ("Blessing", "Udo", "JSS 2A", "F", None, "active"),
            ("Musa", "Abdullahi", "JSS 2A", "M", Some("Mr. Abdullahi"), "active"),
            ("Kemi", "Adebayo", "JSS 2A", "F", Some("Mrs. Adebayo"), "active"),
            ("Ifeanyi", "Obi", "JSS 2A", "M", Some("Mr. Obi"), "active"),
            ("Zainab", "Yusuf", "JSS 2A", "F", Some("Mrs. Yusuf"), "active"),
        ];
        for (i, (first, surname, class, gender, guardian, status)) in
            students.into_iter().enumerate()
        {
            let n = i as u32 + 1;
            store.add_student(Student {
                id: 0,
                admission_no: format!("GSS/2024/{n:03}"),
                first_name: first.to_string(),
                surname: surname.to_string(),
                class: class.to_string(),
                gender: gender.to_string(),
                guardian: guardian.map(str::to_string),
                status: status.to_string(),
                admitted: date(2024, 9, n.min(28)),
            });
        }

        let teachers = [
            ("Mrs. Adaeze Nnamdi", "Mathematics", Some("0803 555 0101")),
            ("Mr. Kola Ajayi", "English Language", Some("0803 555 0102")),
            ("Mallam Sani Garba", "Basic Science", None),
            ("Ms. Funke Oladipo", "Social Studies", Some("0803 555 0104")),
        ];
        let mut first_teacher = None;
        for (name, subject, phone) in teachers {
            let email = format!(
                "{}@school.test",
                name.split_whitespace().last().unwrap_or(name).to_lowercase()
            );
            let id = store.add_teacher(Teacher {
                id: 0,
                name: name.to_string(),
                subject: subject.to_string(),
                email,
                phone: phone.map(str::to_string),
                status: "active".to_string(),
            });
            first_teacher.get_or_insert(id);
        }

        let student_ids: Vec<u32> = store.students.iter().map(|s| s.id).collect();
        for (i, &student_id) in student_ids.iter().enumerate() {
            let paid = match i % 3 {
                0 => 85000.0,
                1 => 40000.0,
                _ => 0.0,
            };
            let fees = [
                ("First Term", "Tuition", 85000.0, paid, date(2024, 9, 30)),
                ("First Term", "Development levy", 15000.0, 0.0, date(2024, 10, 15)),
            ];
            for (term, description, amount, paid, due) in fees {
                let fee = Fee {
                    id: 0,
                    student_id,
                    term: term.to_string(),
                    description: description.to_string(),
                    amount,
                    paid,
                    due,
                };
                if let Err(e) = store.add_fee(fee) {
                    warn!("Skipping seed fee: {e}");
                }
            }
        }

        store.add_account(Account {
            email: "superadmin@school.test".to_string(),
            password: "super123".to_string(),
            role: Role::SuperAdmin,
            display_name: "Super Admin".to_string(),
            linked_id: None,
        });
        store.add_account(Account {
            email: "admin@school.test".to_string(),
            password: "admin123".to_string(),
            role: Role::Admin,
            display_name: "School Admin".to_string(),
            linked_id: None,
        });
        store.add_account(Account {
            email: "nnamdi@school.test".to_string(),
            password: "teacher123".to_string(),
            role: Role::Teacher,
            display_name: "Mrs. Adaeze Nnamdi".to_string(),
            linked_id: first_teacher,
        });
        store.add_account(Account {
            email: "fatima.ibrahim@school.test".to_string(),
            password: "student123".to_string(),
            role: Role::Student,
            display_name: "Fatima Ibrahim".to_string(),
            linked_id: store
                .students
                .iter()
                .find(|s| s.surname == "Ibrahim")
                .map(|s| s.id),
        });

        info!(
            "Seeded store: {} students, {} teachers, {} fees",
            store.students.len(),
            store.teachers.len(),
            store.fees.len()
        );
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_classes() {
        let store = SchoolStore::seeded();
        let count = |class: &str| store.students().iter().filter(|s| s.class == class).count();
        assert_eq!(store.students().len(), 12);
        assert_eq!(count("JSS 1A"), 5);
        assert_eq!(count("JSS 2A"), 7);
        let pending: Vec<&str> = store
            .students()
            .iter()
            .filter(|s| s.status == "pending")
            .map(|s| s.surname.as_str())
            .collect();
        assert_eq!(pending, vec!["Ibrahim"]);
    }

    #[test]
    fn seeded_fees_cover_every_student() {
        let store = SchoolStore::seeded();
        assert_eq!(store.fees().len(), 2 * store.students().len());
        for student in store.students() {
            let fees = store.fees().iter().filter(|f| f.student_id == student.id).count();
            assert_eq!(fees, 2, "{}", student.surname);
        }
    }

    #[test]
    fn login_is_case_insensitive_on_email_only() {
        let store = SchoolStore::seeded();
        let session = store.authenticate("ADMIN@school.test", "admin123").unwrap();
        assert_eq!(session.role, Role::Admin);
        assert_eq!(
            store.authenticate("admin@school.test", "ADMIN123"),
            Err(StoreError::InvalidCredentials)
        );
        let student = store
            .authenticate("fatima.ibrahim@school.test", "student123")
            .unwrap();
        assert_eq!(
            store.student(student.linked_id.unwrap()).map(|s| s.surname.as_str()),
            Some("Ibrahim")
        );
    }

    #[test]
    fn payments_update_status() {
        let mut store = SchoolStore::seeded();
        let fee = store.fees().iter().find(|f| f.status() == "pending").unwrap().clone();
        let balance = store.record_payment(fee.id, 5000.0).unwrap();
        assert_eq!(balance, fee.amount - 5000.0);
        let status = |store: &SchoolStore| {
            store.fees().iter().find(|f| f.id == fee.id).unwrap().status()
        };
        assert_eq!(status(&store), "partial");
        assert_eq!(store.record_payment(fee.id, 1e9).unwrap(), 0.0);
        assert_eq!(status(&store), "paid");
        assert_eq!(
            store.record_payment(fee.id, 0.0),
            Err(StoreError::InvalidAmount(0.0))
        );
        assert!(matches!(
            store.record_payment(9999, 1.0),
            Err(StoreError::NotFound { kind: "fee", .. })
        ));
    }

    #[test]
    fn removing_a_student_removes_their_fees() {
        let mut store = SchoolStore::seeded();
        let id = store.students()[0].id;
        assert!(store.fees().iter().any(|f| f.student_id == id));
        let removed = store.remove_student(id).unwrap();
        assert_eq!(removed.surname, "Okafor");
        assert!(!store.fees().iter().any(|f| f.student_id == id));
        assert!(store.remove_student(id).is_err());
    }

    #[test]
    fn update_keeps_the_id() {
        let mut store = SchoolStore::seeded();
        let id = store.students()[1].id;
        store
            .update_student(id, |s| {
                s.class = "JSS 2A".to_string();
                s.id = 0;
            })
            .unwrap();
        assert_eq!(store.student(id).map(|s| s.class.as_str()), Some("JSS 2A"));
    }

    #[test]
    fn fees_need_a_known_student() {
        let mut store = SchoolStore::default();
        let fee = Fee {
            id: 0,
            student_id: 42,
            term: "First Term".into(),
            description: "Tuition".into(),
            amount: 1.0,
            paid: 0.0,
            due: NaiveDate::default(),
        };
        assert!(store.add_fee(fee).is_err());
        let teacher = store.add_teacher(Teacher {
            id: 0,
            name: "Mr. Test".into(),
            subject: "PHE".into(),
            email: "test@school.test".into(),
            phone: None,
            status: "active".into(),
        });
        assert_eq!(store.remove_teacher(teacher).unwrap().subject, "PHE");
    }
}
