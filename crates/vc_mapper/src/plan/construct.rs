use alloc::boxed::Box;
use alloc::vec::Vec;

use vc_shape::{Constructor, ConstructorArgs, Mapped, ParamInfo, Shape};

use crate::DocumentErrorKind;

/// A value read for a property, waiting for its owner to exist.
pub(crate) struct Pending {
    /// Index of the property in its record plan.
    pub index: usize,
    pub name: &'static str,
    pub shape: &'static Shape,
    pub value: Box<dyn Mapped>,
}

/// Builds records that have no default value from the values read for them.
///
/// Each candidate constructor is scored against the pending values:
/// `100 × matched − 99 × unmatched` parameters. A parameter matches a value
/// when their names are equal ignoring ASCII case and the value fits the
/// parameter's type. The highest score wins, the first declared on ties.
/// This favors consuming more of the document over synthesizing missing
/// arguments, but it is a heuristic, not an optimal assignment.
pub struct ConstructionPlan {
    candidates: Vec<Constructor>,
}

fn fits(param: &Shape, value: &Shape) -> bool {
    param.id() == value.id()
        || param
            .as_optional()
            .is_some_and(|info| info.inner().id() == value.id())
}

fn matches(param: &ParamInfo, pending: &Pending) -> bool {
    param.name().eq_ignore_ascii_case(pending.name) && fits(param.shape(), pending.shape)
}

impl ConstructionPlan {
    pub(crate) fn new(candidates: &[Constructor]) -> Self {
        Self {
            candidates: candidates.to_vec(),
        }
    }

    #[inline]
    pub fn candidates(&self) -> &[Constructor] {
        &self.candidates
    }

    fn score(candidate: &Constructor, values: &[Pending]) -> i64 {
        let matched = candidate
            .params()
            .iter()
            .filter(|param| values.iter().any(|value| matches(param, value)))
            .count() as i64;
        let unmatched = candidate.params().len() as i64 - matched;
        100 * matched - 99 * unmatched
    }

    /// Index of the winning candidate.
    pub(crate) fn select(&self, values: &[Pending]) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (index, candidate) in self.candidates.iter().enumerate() {
            let score = Self::score(candidate, values);
            log::trace!("constructor #{index} scores {score}");
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Invokes the winning candidate.
    ///
    /// Returns the instance and the values no parameter consumed.
    pub(crate) fn construct(
        &self,
        mut values: Vec<Pending>,
    ) -> Result<(Box<dyn Mapped>, Vec<Pending>), DocumentErrorKind> {
        let Some(index) = self.select(&values) else {
            return Err(DocumentErrorKind::NoValueProduced);
        };
        let candidate = &self.candidates[index];

        let mut args = ConstructorArgs::new();
        for param in candidate.params() {
            let value = match values.iter().position(|value| matches(param, value)) {
                Some(position) => {
                    let pending = values.remove(position);
                    adapt(param, pending)?
                }
                None => param
                    .default_value()
                    .or_else(|| param.shape().empty_value())
                    .ok_or(DocumentErrorKind::MissingConstructorArgument(param.name()))?,
            };
            args.push(param.name(), value);
        }

        let instance = candidate.invoke(&mut args)?;
        Ok((instance, values))
    }
}

fn adapt(param: &ParamInfo, pending: Pending) -> Result<Box<dyn Mapped>, DocumentErrorKind> {
    let shape = param.shape();
    if shape.id() == pending.shape.id() {
        return Ok(pending.value);
    }
    let mismatch = || DocumentErrorKind::TypeMismatch {
        field: pending.name,
        expected: shape.type_path(),
    };
    let info = shape.as_optional().ok_or_else(mismatch)?;
    info.some(pending.value).map_err(|_| mismatch())
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use vc_shape::Typed;

    use super::*;
    use crate::tests::models::Triple;

    fn pending(index: usize, name: &'static str, value: impl Typed) -> Pending {
        Pending {
            index,
            name,
            shape: value.shape(),
            value: Box::new(value),
        }
    }

    fn plan() -> ConstructionPlan {
        ConstructionPlan::new(Triple::type_shape().as_record().unwrap().constructors())
    }

    #[test]
    fn most_matches_fewest_misses() {
        let plan = plan();
        let a_b = [pending(0, "A", 1_i32), pending(1, "B", String::from("b"))];
        assert_eq!(plan.select(&a_b), Some(1));
        assert_eq!(plan.select(&a_b[..1]), Some(0));
        assert_eq!(plan.select(&[]), Some(0));
    }

    #[test]
    fn names_and_types_must_both_match() {
        let plan = plan();
        let wrong_type = [pending(0, "a", 1_i32), pending(1, "b", 2_i32)];
        assert_eq!(plan.select(&wrong_type), Some(0));
    }

    #[test]
    fn unmatched_parameters_take_defaults() {
        let plan = plan();
        let values = vec![pending(0, "A", 5_i32), pending(2, "Extra", 9_u8)];
        let (instance, rest) = plan.construct(values).unwrap();

        let triple = instance.take::<Triple>().ok().unwrap();
        assert_eq!(triple.a, 5);
        assert_eq!(triple.built_with, 1);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].name, "Extra");
    }

    #[test]
    fn optional_parameter_wraps_value() {
        let plan = plan();
        let values = vec![
            pending(0, "a", 1_i32),
            pending(1, "b", String::from("x")),
            pending(2, "c", true),
        ];
        let (instance, rest) = plan.construct(values).unwrap();
        let triple = instance.take::<Triple>().ok().unwrap();
        assert_eq!(triple.built_with, 3);
        assert_eq!(triple.c, Some(true));
        assert!(rest.is_empty());
    }
}
