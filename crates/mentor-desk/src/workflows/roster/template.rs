use super::domain::RosterKind;

const TEACHER_TEMPLATE: &str = "email\n\
teacher1@example.com\n\
teacher2@example.com\n\
teacher3@example.com";

const STUDENT_TEMPLATE: &str = "email,name,phone,department,year,division,rollno\n\
student1@example.com,John Doe,1234567890,Computer,Second Year,A,101\n\
student2@example.com,Jane Smith,9876543210,IT,Third Year,B,102";

/// Sample upload for staff to fill in.
pub fn template_csv(kind: RosterKind) -> &'static str {
    match kind {
        RosterKind::Teacher => TEACHER_TEMPLATE,
        RosterKind::Student => STUDENT_TEMPLATE,
    }
}

pub fn template_file_name(kind: RosterKind) -> String {
    format!("{}-import-template.csv", kind.collection())
}
