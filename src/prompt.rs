use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use colored::*;

use crate::config::PdfSettings;
use crate::fonts::BuiltinFont;

/// Line-oriented questions over any reader/writer pair. Invalid answers are
/// reported and asked again; end of input aborts.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn ask_line(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{} ", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        let read = self
            .input
            .read_line(&mut answer)
            .with_context(|| "Failed to read from stdin")?;
        if read == 0 {
            bail!("No answer given for \"{}\"", question);
        }
        Ok(answer.trim().to_string())
    }

    /// Asks until `parse` accepts the answer.
    pub fn ask_with<T>(
        &mut self,
        question: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<T> {
        loop {
            let answer = self.ask_line(question)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(message) => writeln!(self.output, "{}", message.red())?,
            }
        }
    }

    pub fn ask_positive(&mut self, question: &str) -> Result<f32> {
        self.ask_with(question, |answer| parse_number(answer, false))
    }

    pub fn ask_non_negative(&mut self, question: &str) -> Result<f32> {
        self.ask_with(question, |answer| parse_number(answer, true))
    }

    pub fn ask_url(&mut self) -> Result<String> {
        self.ask_with("Enter the URL of the table of contents:", |answer| {
            url::Url::parse(answer)
                .map(|_| answer.to_string())
                .map_err(|e| format!("\"{}\" is not a valid URL: {}", answer, e))
        })
    }

    /// Fills in the PDF settings that were not given on the command line,
    /// asking again from the start while the combination is unusable.
    pub fn complete_pdf_settings(&mut self, given: PartialPdfSettings) -> Result<PdfSettings> {
        loop {
            let settings = PdfSettings {
                page_width_in: match given.page_width_in {
                    Some(v) => v,
                    None => self.ask_positive("Enter the page width in inches:")?,
                },
                page_height_in: match given.page_height_in {
                    Some(v) => v,
                    None => self.ask_positive("Enter the page height in inches:")?,
                },
                margin_left_in: match given.margin_left_in {
                    Some(v) => v,
                    None => self.ask_non_negative("Enter the left margin in inches:")?,
                },
                margin_bottom_in: match given.margin_bottom_in {
                    Some(v) => v,
                    None => self.ask_non_negative("Enter the bottom margin in inches:")?,
                },
                font_size_pt: match given.font_size_pt {
                    Some(v) => v,
                    None => self.ask_positive("Enter the font size in points:")?,
                },
                font: match given.font {
                    Some(font) => font,
                    None => self.ask_with("Enter the font name:", BuiltinFont::from_str)?,
                },
            };

            match settings.validate() {
                Ok(()) => return Ok(settings),
                Err(e) if given.is_complete() => return Err(e),
                Err(e) => writeln!(self.output, "{}", e.to_string().red())?,
            }
        }
    }
}

/// PDF settings as far as the command line provided them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialPdfSettings {
    pub page_width_in: Option<f32>,
    pub page_height_in: Option<f32>,
    pub margin_left_in: Option<f32>,
    pub margin_bottom_in: Option<f32>,
    pub font_size_pt: Option<f32>,
    pub font: Option<BuiltinFont>,
}

impl PartialPdfSettings {
    pub fn is_complete(&self) -> bool {
        self.page_width_in.is_some()
            && self.page_height_in.is_some()
            && self.margin_left_in.is_some()
            && self.margin_bottom_in.is_some()
            && self.font_size_pt.is_some()
            && self.font.is_some()
    }
}

pub fn parse_number(answer: &str, allow_zero: bool) -> Result<f32, String> {
    let value = answer
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("\"{}\" is not a number.", answer))?;
    if !value.is_finite() || value < 0.0 || (!allow_zero && value == 0.0) {
        return Err(if allow_zero {
            "Must be zero or positive number.".to_string()
        } else {
            "Must be a positive number.".to_string()
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompter(input: &str) -> Prompter<&[u8], Vec<u8>> {
        Prompter::new(input.as_bytes(), Vec::new())
    }

    #[test]
    fn reprompts_until_number_is_valid() {
        let mut p = prompter("abc\n-2\n0\n6.5\n");
        assert_eq!(p.ask_positive("Width?").unwrap(), 6.5);
        let transcript = String::from_utf8(p.output).unwrap();
        assert_eq!(transcript.matches("Width?").count(), 4);
        assert!(transcript.contains("not a number"));
    }

    #[test]
    fn end_of_input_aborts() {
        let mut p = prompter("x\n");
        assert!(p.ask_positive("Width?").is_err());
    }

    #[test]
    fn asks_only_for_missing_settings() {
        let given = PartialPdfSettings {
            page_width_in: Some(6.0),
            page_height_in: Some(9.0),
            margin_bottom_in: Some(0.5),
            ..PartialPdfSettings::default()
        };
        let mut p = prompter("0.75\n11\nGaramond\ntimes\n");
        let settings = p.complete_pdf_settings(given).unwrap();
        assert_eq!(
            settings,
            PdfSettings {
                page_width_in: 6.0,
                page_height_in: 9.0,
                margin_left_in: 0.75,
                margin_bottom_in: 0.5,
                font_size_pt: 11.0,
                font: BuiltinFont::TimesRoman,
            }
        );
    }

    #[test]
    fn asks_again_when_margins_eat_the_page() {
        let mut p = prompter("4\n4\n2\n0.5\n10\ncourier\n4\n4\n0.5\n0.5\n10\ncourier\n");
        let settings = p
            .complete_pdf_settings(PartialPdfSettings::default())
            .unwrap();
        assert_eq!(settings.margin_left_in, 0.5);
        assert!(String::from_utf8(p.output).unwrap().contains("leave no room"));
    }

    #[test]
    fn invalid_complete_settings_fail_without_prompting() {
        let given = PartialPdfSettings {
            page_width_in: Some(2.0),
            page_height_in: Some(9.0),
            margin_left_in: Some(1.0),
            margin_bottom_in: Some(0.5),
            font_size_pt: Some(11.0),
            font: Some(BuiltinFont::Helvetica),
        };
        assert!(prompter("").complete_pdf_settings(given).is_err());
    }
}
