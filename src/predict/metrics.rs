//! The per-class classification report, tabulated from the model's held-out predictions.

use std::fmt::{Display, Formatter};

use aprender::metrics::classification::{accuracy, confusion_matrix, f1_per_class, f1_score, precision, recall, Average};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub class: usize,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Averages {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub support: usize,
}

/// Precision, recall and F1 for every class up to the highest seen in either the truth or the
/// predictions. Undefined ratios (zero denominators) are reported as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f32,
    pub macro_avg: Averages,
    pub weighted_avg: Averages,
}
impl ClassificationReport {
    /// Panics if `truth` and `predicted` differ in length or are empty.
    pub fn compute(truth: &[usize], predicted: &[usize]) -> Self {
        let confusion = confusion_matrix(predicted, truth);
        let f1 = f1_per_class(predicted, truth);
        let classes: Vec<_> = (0..confusion.n_rows())
            .map(|class| {
                let hits = confusion.get(class, class);
                let support = (0..confusion.n_cols()).map(|col| confusion.get(class, col)).sum();
                let predicted = (0..confusion.n_rows()).map(|row| confusion.get(row, class)).sum();
                ClassMetrics {
                    class,
                    precision: ratio(hits, predicted),
                    recall: ratio(hits, support),
                    f1: f1[class],
                    support,
                }
            })
            .collect();

        let support = truth.len();
        let averages = |average| Averages {
            precision: precision(predicted, truth, average),
            recall: recall(predicted, truth, average),
            f1: f1_score(predicted, truth, average),
            support,
        };
        Self {
            classes,
            accuracy: accuracy(predicted, truth),
            macro_avg: averages(Average::Macro),
            weighted_avg: averages(Average::Weighted),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}

const NAME_WIDTH: usize = 12;

impl Display for ClassificationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:>NAME_WIDTH$}  {:>9} {:>9} {:>9} {:>9}\n",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for metrics in &self.classes {
            write_row(
                f,
                &metrics.class.to_string(),
                metrics.precision,
                metrics.recall,
                metrics.f1,
                metrics.support,
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>NAME_WIDTH$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, averages) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            write_row(f, name, averages.precision, averages.recall, averages.f1, averages.support)?;
        }
        Ok(())
    }
}

fn write_row(
    f: &mut Formatter<'_>,
    name: &str,
    precision: f32,
    recall: f32,
    f1: f32,
    support: usize,
) -> std::fmt::Result {
    writeln!(f, "{name:>NAME_WIDTH$}  {precision:>9.2} {recall:>9.2} {f1:>9.2} {support:>9}")
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;

    #[test]
    fn report_for_known_confusion() {
        let report = ClassificationReport::compute(&[0, 0, 1, 1], &[0, 1, 1, 1]);
        assert_eq!(2, report.classes.len());
        let (zero, one) = (&report.classes[0], &report.classes[1]);
        assert_f32_near!(1.0, zero.precision);
        assert_f32_near!(0.5, zero.recall);
        assert_float_absolute_eq!(2.0 / 3.0, zero.f1, 1e-6);
        assert_eq!(2, zero.support);
        assert_float_absolute_eq!(2.0 / 3.0, one.precision, 1e-6);
        assert_f32_near!(1.0, one.recall);
        assert_float_absolute_eq!(0.8, one.f1, 1e-6);
        assert_f32_near!(0.75, report.accuracy);
        assert_float_absolute_eq!(5.0 / 6.0, report.macro_avg.precision, 1e-6);
        assert_float_absolute_eq!(0.75, report.macro_avg.recall, 1e-6);
        assert_float_absolute_eq!((2.0 / 3.0 + 0.8) / 2.0, report.weighted_avg.f1, 1e-6);
        assert_eq!(4, report.weighted_avg.support);
    }

    #[test]
    fn report_text() {
        let report = ClassificationReport::compute(&[0, 0, 1, 1], &[0, 1, 1, 1]);
        let expected = "              precision    recall  f1-score   support\n\n\
                        \x20          0       1.00      0.50      0.67         2\n\
                        \x20          1       0.67      1.00      0.80         2\n\n\
                        \x20   accuracy                           0.75         4\n\
                        \x20  macro avg       0.83      0.75      0.73         4\n\
                        weighted avg       0.83      0.75      0.73         4\n";
        assert_eq!(expected, report.to_string());
    }

    #[test]
    fn undefined_ratios_are_zero() {
        let report = ClassificationReport::compute(&[1, 1, 1], &[0, 1, 1]);
        let zero = &report.classes[0];
        assert_eq!((0.0, 0.0, 0.0, 0), (zero.precision, zero.recall, zero.f1, zero.support));
        let one = &report.classes[1];
        assert_f32_near!(1.0, one.precision);
        assert_float_absolute_eq!(2.0 / 3.0, one.recall, 1e-6);
        assert_float_absolute_eq!(0.8, one.f1, 1e-6);
        assert_float_absolute_eq!(0.8, report.weighted_avg.f1, 1e-6);
    }

    #[test]
    fn classes_range_up_to_highest_label() {
        let report = ClassificationReport::compute(&[1, 1], &[1, 1]);
        assert_eq!(vec![0, 1], report.classes.iter().map(|metrics| metrics.class).collect::<Vec<_>>());
        assert_eq!(0, report.classes[0].support);
        assert_f32_near!(1.0, report.classes[1].f1);
        assert_f32_near!(1.0, report.accuracy);
    }
}
