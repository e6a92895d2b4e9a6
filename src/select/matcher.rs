
use input;
use text;
use select::{ Step, Compound, Condition, Operator, Combinator };

/// An element as seen by selector matching.
pub(crate) trait MatchTarget {

    /// The lowercased tag name.
    fn local_name(&self) -> &str;

    /// Value of the attribute with the given lowercased name.
    fn attribute(&self, name: &str) -> Option<&str>;
}

/// Match the steps (subject first) against `element` and its ancestors (root first).
///
/// Every pair of step and candidate node is evaluated at most once, so failing
/// descendant chains cost at most `steps × depth²` compound checks.
pub(crate) fn matches_complex<T>(steps: &[Step], element: &T, ancestors: &[T]) -> bool
where T: MatchTarget {
    if steps.is_empty() {
        return false;
    }
    let mut path = Path {
        steps,
        element,
        ancestors,
        failed: vec![false; steps.len() * (ancestors.len() + 1)],
    };
    path.matches(0, ancestors.len())
}

/// The node at `ancestors.len()` is the element itself.
struct Path<'a, T: 'a> {
    steps: &'a [Step],
    element: &'a T,
    ancestors: &'a [T],
    failed: Vec<bool>,
}

impl<'a, T> Path<'a, T> where T: MatchTarget {

    fn node(&self, position: usize) -> &'a T {
        match self.ancestors.get(position) {
            Some(ancestor) => ancestor,
            None => self.element,
        }
    }

    fn matches(&mut self, step: usize, position: usize) -> bool {
        let key = step * (self.ancestors.len() + 1) + position;
        if self.failed[key] {
            return false;
        }
        let matched = self.matches_unseen(step, position);
        if !matched {
            self.failed[key] = true;
        }
        matched
    }

    fn matches_unseen(&mut self, step: usize, position: usize) -> bool {
        if !matches_compound(&self.steps[step].compound, self.node(position)) {
            return false;
        }
        let combinator = match self.steps.get(step + 1) {
            None => return true,
            Some(next) => next.combinator,
        };
        match combinator {
            Some(Combinator::Child) =>
                position > 0 && self.matches(step + 1, position - 1),
            Some(Combinator::Descendant) | None =>
                (0..position).rev().any(|index| self.matches(step + 1, index)),
        }
    }
}

fn matches_compound<T>(compound: &Compound, element: &T) -> bool
where T: MatchTarget {
    if let Some(ref tag) = compound.tag {
        if !text::identifier_eq(tag, element.local_name()) {
            return false;
        }
    }
    compound.conditions.iter().all(|condition| matches_condition(condition, element))
}

fn matches_condition<T>(condition: &Condition, element: &T) -> bool
where T: MatchTarget {
    match *condition {
        Condition::Id(ref id) =>
            element.attribute("id").map(|found| found == id.as_str()).unwrap_or(false),
        Condition::Class(ref class) =>
            element.attribute("class")
                .map(|classes| classes.split(input::is_whitespace).any(|found| found == class.as_str()))
                .unwrap_or(false),
        Condition::Attribute { ref name, value: None, .. } =>
            element.attribute(name).is_some(),
        Condition::Attribute { ref name, value: Some((operator, ref expected)), case_insensitive } =>
            element.attribute(name)
                .map(|actual| matches_value(operator, actual, expected, case_insensitive))
                .unwrap_or(false),
    }
}

fn matches_value(operator: Operator, actual: &str, expected: &str, case_insensitive: bool)
-> bool {

    let eq = |left: &str, right: &str|
        if case_insensitive { left.eq_ignore_ascii_case(right) } else { left == right };
    let len = expected.len();

    match operator {
        Operator::Equals =>
            eq(actual, expected),
        Operator::Includes =>
            !expected.is_empty()
            && !expected.contains(input::is_whitespace)
            && actual.split(input::is_whitespace).any(|word| eq(word, expected)),
        Operator::DashMatch =>
            eq(actual, expected)
            || (actual.as_bytes().get(len) == Some(&b'-')
                && actual.get(..len).map(|prefix| eq(prefix, expected)).unwrap_or(false)),
        Operator::Prefix =>
            !expected.is_empty()
            && actual.get(..len).map(|prefix| eq(prefix, expected)).unwrap_or(false),
        Operator::Suffix =>
            !expected.is_empty()
            && actual.len() >= len
            && actual.get((actual.len() - len)..)
                .map(|suffix| eq(suffix, expected))
                .unwrap_or(false),
        Operator::Substring =>
            !expected.is_empty()
            && if case_insensitive {
                actual.to_ascii_lowercase().contains(&expected.to_ascii_lowercase())
            } else {
                actual.contains(expected)
            },
    }
}

#[cfg(test)]
mod tests {
    use std::time::{ Duration, Instant };

    use select::Selector;

    struct Element {
        name: &'static str,
        attributes: Vec<(&'static str, &'static str)>,
    }

    impl super::MatchTarget for Element {

        fn local_name(&self) -> &str { self.name }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|&&(found, _)| found == name)
                .map(|&(_, value)| value)
        }
    }

    fn element(name: &'static str, attributes: &[(&'static str, &'static str)]) -> Element {
        Element { name, attributes: attributes.to_vec() }
    }

    fn matches(selector: &str, path: &[Element]) -> bool {
        let selector: Selector = selector.parse().unwrap();
        let (element, ancestors) = path.split_last().unwrap();
        selector.matches(element, ancestors)
    }

    #[test]
    fn simple() {
        let path = [element("div", &[("id", "Main"), ("class", " a  b ")])];
        assert!(matches("*", &path));
        assert!(matches("DIV", &path));
        assert!(matches("#Main", &path));
        assert!(!matches("#main", &path));
        assert!(matches(".a.b", &path));
        assert!(matches("div.b#Main", &path));
        assert!(!matches(".c", &path));
        assert!(!matches("span, .c", &path));
        assert!(matches("span, .b", &path));
    }

    #[test]
    fn attribute_operators() {
        let path = [element("a", &[
            ("href", "https://example.com/x.pdf"),
            ("lang", "en-US"),
            ("rel", "nofollow noopener"),
            ("empty", ""),
        ])];
        assert!(matches("[href]", &path));
        assert!(matches("[empty]", &path));
        assert!(matches("[empty='']", &path));
        assert!(!matches("[missing]", &path));
        assert!(matches("[href^='https:']", &path));
        assert!(!matches("[href^='HTTPS:']", &path));
        assert!(matches("[href^='HTTPS:' i]", &path));
        assert!(matches("[href$='.pdf']", &path));
        assert!(matches("[href*=example]", &path));
        assert!(!matches("[href*='']", &path));
        assert!(matches("[lang|=en]", &path));
        assert!(!matches("[lang|=e]", &path));
        assert!(matches("[rel~=noopener]", &path));
        assert!(!matches("[rel~='nofollow noopener']", &path));
    }

    #[test]
    fn combinators() {
        let path = [
            element("html", &[]),
            element("body", &[("class", "page")]),
            element("ul", &[]),
            element("li", &[]),
            element("p", &[]),
        ];
        assert!(matches("li p", &path));
        assert!(matches("li > p", &path));
        assert!(matches("ul p", &path));
        assert!(!matches("ul > p", &path));
        assert!(matches("html .page li > p", &path));
        assert!(matches("body > ul > li > p", &path));
        assert!(!matches("body > li p", &path));
        assert!(!matches("p p", &path));
    }

    #[test]
    fn descendant_backtracking() {
        let path = [
            element("div", &[("class", "x")]),
            element("div", &[]),
            element("span", &[]),
            element("b", &[]),
        ];
        assert!(matches(".x > div b", &path));
        assert!(!matches(".x > span b", &path));
    }

    #[test]
    fn deep_failing_descendant_chain() {
        let mut path: Vec<Element> = (0..200).map(|_| element("a", &[])).collect();
        path.push(element("b", &[]));
        let started = Instant::now();
        assert!(!matches("x a a a a a a a b", &path));
        assert!(!matches("a a a a a a a a > x b", &path));
        assert!(matches("a a a a a a a a b", &path));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
