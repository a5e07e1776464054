//! The interactive menu.
//!
//! The menu reads answers line by line from any [BufRead] and writes to any [Write],
//! so that a session can be replayed from memory. End of input quits at any prompt.

use std::{
    fmt::Display,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use colored::Colorize;
use tracing::debug;

use crate::{
    parser::read_matrix,
    poly::{
        roots::{BisectionResult, RootInterval, Termination},
        univariate::Polynomial,
    },
    printer::{format_radix, MatrixPrinter, VectorPrinter},
    settings::Settings,
    tensors::elimination::{Classification, Method, PivotAction, ReductionStep},
};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// The highest degree accepted for a polynomial typed at the menu.
const MAX_DEGREE: usize = 100;

const BASES: [(&str, u32); 3] = [("Hexadecimal", 16), ("Octal", 8), ("Binary", 2)];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Menu<R: BufRead, W: Write> {
    input: R,
    output: W,
    settings: Settings,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W, settings: Settings) -> Menu<R, W> {
        Menu {
            input,
            output,
            settings,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Show the menu until the user quits or the input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            if self.settings.clear_screen {
                self.output.write_all(CLEAR_SCREEN.as_bytes())?;
            }
            self.show_options()?;

            let Some(choice) = self.prompt("Option: ")? else {
                break;
            };
            debug!("Selected option '{}'", choice);

            let flow = match choice.as_str() {
                "1" => self.base_conversion()?,
                "2" => self.linear_system(Method::Gauss)?,
                "3" => self.linear_system(Method::Jordan)?,
                "4" => self.polynomial_roots()?,
                "0" => Flow::Quit,
                _ => {
                    self.error(format!("Unknown option '{}'", choice))?;
                    Flow::Continue
                }
            };

            if flow == Flow::Quit {
                break;
            }

            if self.settings.clear_screen && self.prompt("Press enter to continue...")?.is_none() {
                break;
            }
        }

        writeln!(self.output)?;
        self.output.flush()
    }

    fn show_options(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", "Numerical methods".bold())?;
        writeln!(self.output, "  1. Convert a number to base 16, 8 and 2")?;
        writeln!(self.output, "  2. Solve a linear system (Gauss)")?;
        writeln!(self.output, "  3. Solve a linear system (Gauss-Jordan)")?;
        writeln!(self.output, "  4. Bracket and approximate the roots of a polynomial")?;
        writeln!(self.output, "  0. Quit")
    }

    /// Write `text` and read one trimmed line. Returns `None` at the end of the input.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_owned()))
    }

    /// Ask for a finite number until one is given.
    fn read_number(&mut self, text: &str) -> io::Result<Option<f64>> {
        loop {
            let Some(line) = self.prompt(text)? else {
                return Ok(None);
            };

            match line.parse::<f64>() {
                Ok(x) if x.is_finite() => return Ok(Some(x)),
                _ => self.error(format!("'{}' is not a number", line))?,
            }
        }
    }

    fn error(&mut self, e: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", format!("Error: {}", e).red())
    }

    fn base_conversion(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "{}", "Base conversion".bold())?;

        let Some(x) = self.read_number("Number: ")? else {
            return Ok(Flow::Quit);
        };

        for (name, base) in BASES {
            let label = format!("{}:", name);
            match format_radix(x, base, self.settings.radix) {
                Ok(s) => writeln!(self.output, "{:<13}{}", label, s)?,
                Err(e) => writeln!(self.output, "{:<13}{}", label, e.to_string().red())?,
            }
        }

        Ok(Flow::Continue)
    }

    fn linear_system(&mut self, method: Method) -> io::Result<Flow> {
        writeln!(self.output, "{}", format!("Linear system ({})", method).bold())?;

        let default = self.settings.matrix_file.clone();
        let text = match &default {
            Some(p) => format!("Matrix file [{}]: ", p.display()),
            None => "Matrix file: ".to_owned(),
        };
        let Some(answer) = self.prompt(&text)? else {
            return Ok(Flow::Quit);
        };

        let path = match (answer.is_empty(), default) {
            (false, _) => PathBuf::from(answer),
            (true, Some(p)) => p,
            (true, None) => {
                self.error("No file given")?;
                return Ok(Flow::Continue);
            }
        };

        let matrix = match read_matrix(&path) {
            Ok(m) => m,
            Err(e) => {
                self.error(e)?;
                return Ok(Flow::Continue);
            }
        };

        let opts = self.settings.print;
        writeln!(self.output, "Augmented matrix:")?;
        writeln!(self.output, "{}", MatrixPrinter::new_with_options(&matrix, opts))?;

        let reduction = match matrix.reduce(method, &self.settings.elimination) {
            Ok(r) => r,
            Err(e) => {
                self.error(e)?;
                return Ok(Flow::Continue);
            }
        };

        for (k, step) in reduction.steps.iter().enumerate() {
            writeln!(self.output, "Step {}: {}", k + 1, describe_step(step))?;
            writeln!(
                self.output,
                "{}",
                MatrixPrinter::new_with_options(&step.matrix, opts)
            )?;
        }

        if !reduction.permutation.is_identity() {
            let order: Vec<_> = reduction
                .permutation
                .as_slice()
                .iter()
                .map(|u| format!("x{}", u + 1))
                .collect();
            writeln!(self.output, "Column order after swaps: {}", order.join(" "))?;
        }

        let solution = reduction.solve();
        let verdict = format!("The system is {}", solution.classification);
        match solution.classification {
            Classification::Determined => writeln!(self.output, "{}", verdict.green())?,
            Classification::Undetermined => {
                writeln!(self.output, "{}", verdict.yellow())?;
                writeln!(self.output, "A particular solution, with free unknowns set to 0:")?;
            }
            Classification::Incompatible => writeln!(self.output, "{}", verdict.red())?,
        }

        if solution.classification != Classification::Incompatible {
            for (i, x) in solution.values.iter().enumerate() {
                writeln!(self.output, "x{} = {:.*}", i + 1, opts.precision, x)?;
            }
            debug!(
                "Solution {}",
                VectorPrinter::new_with_options(&solution.values, opts)
            );
        }

        Ok(Flow::Continue)
    }

    fn polynomial_roots(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "{}", "Polynomial roots".bold())?;

        let degree = loop {
            let Some(line) = self.prompt("Degree: ")? else {
                return Ok(Flow::Quit);
            };
            match line.parse::<usize>() {
                Ok(d) if (1..=MAX_DEGREE).contains(&d) => break d,
                _ => self.error(format!(
                    "The degree should be an integer between 1 and {}",
                    MAX_DEGREE
                ))?,
            }
        };

        let mut coefficients = Vec::with_capacity(degree + 1);
        for i in 0..=degree {
            let c = loop {
                let Some(c) = self.read_number(&format!("Coefficient of x^{}: ", degree - i))?
                else {
                    return Ok(Flow::Quit);
                };

                if c == 0. && (i == 0 || i == degree) {
                    self.error("The leading coefficient and the constant term should be nonzero")?;
                } else {
                    break c;
                }
            };
            coefficients.push(c);
        }

        let p = match Polynomial::new(coefficients) {
            Ok(p) => p,
            Err(e) => {
                self.error(e)?;
                return Ok(Flow::Continue);
            }
        };
        writeln!(self.output, "p(x) = {}", p)?;

        let bounds = match p.root_bounds() {
            Ok(b) => b,
            Err(e) => {
                self.error(e)?;
                return Ok(Flow::Continue);
            }
        };

        let prec = self.settings.print.precision;
        for (name, interval) in [
            ("Positive", bounds.positive_interval()),
            ("Negative", bounds.negative_interval()),
        ] {
            if interval.is_empty() {
                writeln!(self.output, "{} real roots: none", name)?;
            } else {
                writeln!(
                    self.output,
                    "{} real roots lie in ({:.*}, {:.*})",
                    name, prec, interval.lower, prec, interval.upper
                )?;
            }
        }

        let roots = match p.approximate_roots(self.settings.scan_subdivisions, &self.settings.bisection)
        {
            Ok(r) => r,
            Err(e) => {
                self.error(e)?;
                return Ok(Flow::Continue);
            }
        };
        if roots.is_empty() {
            writeln!(self.output, "No sign change found inside the bounds")?;
        }
        for r in &roots {
            self.show_root(r)?;
        }

        loop {
            let Some(line) = self.prompt("Interval to refine as 'a b' (empty to return): ")? else {
                return Ok(Flow::Quit);
            };
            if line.is_empty() {
                break;
            }

            let ends: Result<Vec<f64>, _> =
                line.split_whitespace().map(|t| t.parse::<f64>()).collect();
            let Ok(ends) = ends else {
                self.error(format!("'{}' is not a pair of numbers", line))?;
                continue;
            };
            let [a, b] = ends[..] else {
                self.error("Expected two numbers")?;
                continue;
            };

            let interval = match RootInterval::new(a, b) {
                Ok(i) => i,
                Err(e) => {
                    self.error(e)?;
                    continue;
                }
            };

            if !interval.has_sign_change(|x| p.evaluate(x)) {
                self.error(format!("p(x) does not change sign on {}", interval))?;
                continue;
            }

            let r = p.bisect(interval, &self.settings.bisection);
            self.show_root(&r)?;
        }

        Ok(Flow::Continue)
    }

    fn show_root(&mut self, r: &BisectionResult) -> io::Result<()> {
        let text = format!(
            "x ~ {:.*} ({} iterations, {})",
            self.settings.print.precision, r.root, r.iterations, r.termination
        );

        if r.termination == Termination::IterationBudgetExhausted {
            writeln!(self.output, "{}", text.yellow())
        } else {
            writeln!(self.output, "{}", text)
        }
    }
}

fn describe_step(step: &ReductionStep) -> String {
    let pivot = format!("pivot at row {}, column {}", step.row + 1, step.column + 1);
    match step.action {
        PivotAction::Eliminated => format!("{}, eliminated", pivot),
        PivotAction::RowSwapped { row } => {
            format!("{}, swapped with row {}, eliminated", pivot, row + 1)
        }
        PivotAction::ColumnSwapped { column } => {
            format!("{}, swapped with column {}, eliminated", pivot, column + 1)
        }
        PivotAction::ColumnZeroed => format!("{}, no pivot: column cleared", pivot),
        PivotAction::Skipped => format!("{}, no pivot: column skipped", pivot),
    }
}
