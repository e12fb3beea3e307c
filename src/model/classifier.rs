// Classifier trait and the linear models that implement it.
//
// The trait is capability-based: a classifier always predicts a class, may
// expose class probabilities, and may expose per-feature coefficients. The
// Scorer asks rather than assumes, which is what lets attribution degrade to
// "absent" instead of failing a prediction.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::vectorizer::SparseVector;

/// Interface every served classifier implements. Implementations must be
/// immutable after construction so concurrent `predict` calls need no lock.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Class labels, in the order probabilities and coefficients use.
    fn classes(&self) -> &[String];

    /// Class probability distribution in `classes()` order, if the model
    /// provides one.
    fn predict_proba(&self, x: &SparseVector) -> Option<Vec<f64>>;

    /// Index into `classes()` of the model's own (thresholdless) prediction.
    fn predict(&self, x: &SparseVector) -> usize;

    /// Per-feature weights pushing towards `classes()[class_idx]`, if the
    /// model is linear.
    fn class_coefficients(&self, class_idx: usize) -> Option<Vec<f64>>;

    /// Feature-space width the model expects, if fixed.
    fn n_features(&self) -> Option<usize>;
}

/// On-disk form of the fitted classifier (`classifier.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    /// Logistic regression. Exposes probabilities and coefficients.
    LogisticRegression {
        classes: Vec<String>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    /// Linear SVM. Coefficients but no probabilities.
    LinearSvc {
        classes: Vec<String>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    /// Class-prior baseline. Probabilities but no coefficients.
    Prior {
        classes: Vec<String>,
        class_prior: Vec<f64>,
    },
}

impl ClassifierArtifact {
    pub fn classes(&self) -> &[String] {
        match self {
            ClassifierArtifact::LogisticRegression { classes, .. }
            | ClassifierArtifact::LinearSvc { classes, .. }
            | ClassifierArtifact::Prior { classes, .. } => classes,
        }
    }

    /// Validate shapes and build the serving-side model.
    pub fn build(self) -> Result<Box<dyn Classifier>, String> {
        match self {
            ClassifierArtifact::LogisticRegression {
                classes,
                coef,
                intercept,
            } => Ok(Box::new(LogisticRegression {
                linear: LinearModel::new(classes, coef, intercept)?,
            })),
            ClassifierArtifact::LinearSvc {
                classes,
                coef,
                intercept,
            } => Ok(Box::new(LinearSvc {
                linear: LinearModel::new(classes, coef, intercept)?,
            })),
            ClassifierArtifact::Prior {
                classes,
                class_prior,
            } => Ok(Box::new(PriorClassifier::new(classes, class_prior)?)),
        }
    }
}

/// Shared weights for linear models. One coefficient row over two classes is
/// the binary form: the row scores `classes[1]`.
#[derive(Debug, Clone)]
struct LinearModel {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

impl LinearModel {
    fn new(classes: Vec<String>, coef: Vec<Vec<f64>>, intercept: Vec<f64>) -> Result<Self, String> {
        if classes.len() < 2 {
            return Err(format!("expected at least 2 classes, found {}", classes.len()));
        }
        let binary = classes.len() == 2 && coef.len() == 1;
        if !binary && coef.len() != classes.len() {
            return Err(format!(
                "{} coefficient rows for {} classes",
                coef.len(),
                classes.len()
            ));
        }
        if intercept.len() != coef.len() {
            return Err(format!(
                "{} intercepts for {} coefficient rows",
                intercept.len(),
                coef.len()
            ));
        }
        let width = coef[0].len();
        if coef.iter().any(|row| row.len() != width) {
            return Err("coefficient rows have different widths".to_string());
        }
        let finite = coef.iter().flatten().chain(intercept.iter()).all(|w| w.is_finite());
        if !finite {
            return Err("non-finite coefficient or intercept".to_string());
        }
        Ok(Self {
            classes,
            coef,
            intercept,
        })
    }

    fn is_binary(&self) -> bool {
        self.coef.len() == 1
    }

    /// Raw decision values, one per coefficient row.
    fn decision_function(&self, x: &SparseVector) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| x.dot(row) + b)
            .collect()
    }

    fn predict(&self, x: &SparseVector) -> usize {
        let scores = self.decision_function(x);
        if self.is_binary() {
            usize::from(scores[0] > 0.0)
        } else {
            argmax(&scores)
        }
    }

    fn class_coefficients(&self, class_idx: usize) -> Option<Vec<f64>> {
        if self.is_binary() {
            match class_idx {
                0 => Some(self.coef[0].iter().map(|w| -w).collect()),
                1 => Some(self.coef[0].clone()),
                _ => None,
            }
        } else {
            self.coef.get(class_idx).cloned()
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    linear: LinearModel,
}

impl Classifier for LogisticRegression {
    fn classes(&self) -> &[String] {
        &self.linear.classes
    }

    fn predict_proba(&self, x: &SparseVector) -> Option<Vec<f64>> {
        let scores = self.linear.decision_function(x);
        if self.linear.is_binary() {
            let p = sigmoid(scores[0]);
            Some(vec![1.0 - p, p])
        } else {
            Some(softmax(&scores))
        }
    }

    fn predict(&self, x: &SparseVector) -> usize {
        self.linear.predict(x)
    }

    fn class_coefficients(&self, class_idx: usize) -> Option<Vec<f64>> {
        self.linear.class_coefficients(class_idx)
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.linear.coef[0].len())
    }
}

#[derive(Debug, Clone)]
pub struct LinearSvc {
    linear: LinearModel,
}

impl Classifier for LinearSvc {
    fn classes(&self) -> &[String] {
        &self.linear.classes
    }

    fn predict_proba(&self, _x: &SparseVector) -> Option<Vec<f64>> {
        None
    }

    fn predict(&self, x: &SparseVector) -> usize {
        self.linear.predict(x)
    }

    fn class_coefficients(&self, class_idx: usize) -> Option<Vec<f64>> {
        self.linear.class_coefficients(class_idx)
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.linear.coef[0].len())
    }
}

const PRIOR_SUM_TOLERANCE: f64 = 1e-6;

/// Predicts the training class distribution regardless of input.
#[derive(Debug, Clone)]
pub struct PriorClassifier {
    classes: Vec<String>,
    class_prior: Vec<f64>,
}

impl PriorClassifier {
    pub fn new(classes: Vec<String>, class_prior: Vec<f64>) -> Result<Self, String> {
        if class_prior.len() != classes.len() {
            return Err(format!(
                "{} class priors for {} classes",
                class_prior.len(),
                classes.len()
            ));
        }
        if class_prior.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err("class priors must be finite and non-negative".to_string());
        }
        let total: f64 = class_prior.iter().sum();
        if (total - 1.0).abs() > PRIOR_SUM_TOLERANCE {
            return Err(format!("class priors sum to {total}, expected 1"));
        }
        Ok(Self {
            classes,
            class_prior,
        })
    }
}

impl Classifier for PriorClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, _x: &SparseVector) -> Option<Vec<f64>> {
        Some(self.class_prior.clone())
    }

    fn predict(&self, _x: &SparseVector) -> usize {
        argmax(&self.class_prior)
    }

    fn class_coefficients(&self, _class_idx: usize) -> Option<Vec<f64>> {
        None
    }

    fn n_features(&self) -> Option<usize> {
        None
    }
}

/// Logistic function: maps any real number to (0, 1).
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
