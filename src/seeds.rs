//! Built-in lessons that make the app useful without any external config.

use crate::domain::{Challenge, Lesson, TestCase};

pub fn seed_lessons() -> Vec<Lesson> {
  vec![
    Lesson {
      id: "python-basics".into(),
      title: "Python Basics".into(),
      content: "Python Basics: variables, types, control flow, functions.\n\nExample:\n".into(),
      challenge: Challenge {
        prompt: "Write a function `is_prime(n)` that returns True if n is prime and False otherwise.".into(),
        starter: "def is_prime(n):\n    # your code here\n    pass\n".into(),
        tests: vec![
          TestCase::new("is_prime(2)", "True"),
          TestCase::new("is_prime(15)", "False"),
          TestCase::new("is_prime(17)", "True"),
        ],
        solution: r#"
def is_prime(n):
    if n < 2:
        return False
    if n == 2:
        return True
    if n % 2 == 0:
        return False
    i = 3
    while i * i <= n:
        if n % i == 0:
            return False
        i += 2
    return True
"#
        .into(),
      },
    },
    Lesson {
      id: "logic-puzzles".into(),
      title: "Logic Puzzles".into(),
      content: "Logic-building: boolean logic, truth tables, small puzzles.\n\nExample: return True if exactly one of a,b is True (XOR).\n".into(),
      challenge: Challenge {
        prompt: "Write `xor(a, b)` that returns True when exactly one is True.".into(),
        starter: "def xor(a, b):\n    # your code here\n    pass\n".into(),
        tests: vec![
          TestCase::new("xor(True, False)", "True"),
          TestCase::new("xor(True, True)", "False"),
          TestCase::new("xor(False, False)", "False"),
        ],
        solution: r#"
def xor(a, b):
    return (a and not b) or (b and not a)
"#
        .into(),
      },
    },
  ]
}
