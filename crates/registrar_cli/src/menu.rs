//! Line-based operator menu.
//!
//! # Responsibility
//! - Render the numbered menu and read one answer per line.
//! - Translate workflow outcomes and errors into operator messages.
//!
//! # Invariants
//! - Workflow errors are printed and never end the loop.
//! - End of input ends the loop with `Input error occurred. Exiting...`.

use registrar_core::{
    Confirmation, PendingRegistration, RegisterOutcome, RegistrationService, RegistrationStore,
};
use std::io::{self, BufRead, Write};

const MENU_TEXT: &str = "1. List Courses\n2. Register for a Course\n3. Drop a Course\n4. Exit";

enum Step {
    Continue,
    Exit,
}

/// Interactive menu bound to one service and one input/output pair.
pub struct Menu<'svc, S: RegistrationStore, R, W> {
    service: &'svc RegistrationService<S>,
    input: R,
    output: W,
}

impl<'svc, S, R, W> Menu<'svc, S, R, W>
where
    S: RegistrationStore,
    R: BufRead,
    W: Write,
{
    pub fn new(service: &'svc RegistrationService<S>, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Runs until the operator exits or input ends.
    pub fn run(mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{MENU_TEXT}")?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                return self.input_exhausted();
            };

            let step = match choice.parse::<u8>() {
                Ok(1) => self.list_courses()?,
                Ok(2) => self.register()?,
                Ok(3) => self.drop_course()?,
                Ok(4) => {
                    writeln!(self.output, "Exiting...")?;
                    Step::Exit
                }
                // Non-numeric input counts as an unknown choice; only end of input exits.
                _ => {
                    writeln!(self.output, "Invalid option. Please try again.")?;
                    Step::Continue
                }
            };

            if let Step::Exit = step {
                return Ok(());
            }
        }
    }

    fn list_courses(&mut self) -> io::Result<Step> {
        match self.service.list_courses() {
            Ok(courses) => {
                for course in courses {
                    writeln!(self.output, "Course Code: {}", course.code)?;
                    writeln!(self.output, "Title: {}", course.title)?;
                    writeln!(self.output, "Description: {}", course.description)?;
                    writeln!(self.output, "Capacity: {}", course.capacity)?;
                    writeln!(self.output, "Schedule: {}", course.schedule)?;
                    writeln!(self.output)?;
                }
            }
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(Step::Continue)
    }

    fn register(&mut self) -> io::Result<Step> {
        let Some((student_id, course_code)) = self.prompt_ids()? else {
            return self.input_exhausted().map(|()| Step::Exit);
        };

        match self.service.register(&student_id, &course_code) {
            Ok(RegisterOutcome::Registered(_)) => {
                writeln!(
                    self.output,
                    "Student registered for the course successfully."
                )?;
                Ok(Step::Continue)
            }
            Ok(RegisterOutcome::NeedsConfirmation(pending)) => self.confirm_new_student(pending),
            Err(err) => {
                writeln!(self.output, "{err}")?;
                Ok(Step::Continue)
            }
        }
    }

    fn confirm_new_student(&mut self, pending: PendingRegistration) -> io::Result<Step> {
        writeln!(
            self.output,
            "Student not found. Would you like to add a new student? (Y/N)"
        )?;
        let Some(answer) = self.read_line()? else {
            return self.input_exhausted().map(|()| Step::Exit);
        };

        if !answer.eq_ignore_ascii_case("y") {
            if let Err(err) = self.service.resolve_pending(pending, Confirmation::Decline) {
                writeln!(self.output, "{err}")?;
            }
            return Ok(Step::Continue);
        }

        let Some(name) = self.prompt("Enter Student Name: ")? else {
            return self.input_exhausted().map(|()| Step::Exit);
        };

        match self
            .service
            .resolve_pending(pending, Confirmation::CreateStudent { name })
        {
            Ok(resolved) => {
                if resolved.student_created {
                    writeln!(self.output, "New student added successfully.")?;
                }
                match resolved.registration {
                    Ok(_) => writeln!(
                        self.output,
                        "Student registered for the course successfully."
                    )?,
                    Err(err) => writeln!(self.output, "{err}")?,
                }
            }
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(Step::Continue)
    }

    fn drop_course(&mut self) -> io::Result<Step> {
        let Some((student_id, course_code)) = self.prompt_ids()? else {
            return self.input_exhausted().map(|()| Step::Exit);
        };

        match self.service.drop_course(&student_id, &course_code) {
            Ok(_) => writeln!(self.output, "Course dropped successfully.")?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(Step::Continue)
    }

    fn prompt_ids(&mut self) -> io::Result<Option<(String, String)>> {
        let Some(student_id) = self.prompt("Enter Student ID: ")? else {
            return Ok(None);
        };
        let Some(course_code) = self.prompt("Enter Course Code: ")? else {
            return Ok(None);
        };
        Ok(Some((student_id, course_code)))
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Reads one trimmed line; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn input_exhausted(&mut self) -> io::Result<()> {
        writeln!(self.output, "Input error occurred. Exiting...")
    }
}
