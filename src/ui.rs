use crate::models::DerivedStatistics;

pub fn render_index(date: &str, total: u64, today: u64, stats: &DerivedStatistics) -> String {
    INDEX_HTML
        .replace("{{DATE}}", date)
        .replace("{{TOTAL}}", &total.to_string())
        .replace("{{TODAY}}", &today.to_string())
        .replace("{{DAILY_AVG}}", &stats.daily_average.to_string())
        .replace("{{WEEKLY_AVG}}", &stats.weekly_average.to_string())
        .replace("{{HIGHEST}}", &stats.highest_day.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="ar" dir="rtl">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>استغفار</title>
  <style>
    :root {
      --bg: #1a202c;
      --card: #2d3748;
      --ink: #f7fafc;
      --muted: #a0aec0;
      --accent: #38a169;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", Tahoma, sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(560px, 100%);
      display: grid;
      gap: 28px;
      text-align: center;
    }

    h1 {
      margin: 0;
      font-size: clamp(2.2rem, 8vw, 3rem);
      color: var(--accent);
    }

    .date {
      color: var(--muted);
    }

    .counter {
      font-size: clamp(3rem, 14vw, 5rem);
      font-weight: 700;
    }

    .tap {
      width: min(220px, 45vw);
      aspect-ratio: 1;
      border-radius: 50%;
      border: none;
      background: var(--accent);
      color: var(--ink);
      font-size: 1.6rem;
      cursor: pointer;
      transition: transform 150ms ease;
    }

    .tap:active {
      transform: scale(1.1);
    }

    .reset {
      border: 1px solid var(--muted);
      background: transparent;
      color: var(--muted);
      border-radius: 999px;
      padding: 10px 24px;
      cursor: pointer;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 14px;
    }

    .stat {
      background: var(--card);
      border-radius: 16px;
      padding: 16px;
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.85rem;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>استغفار</h1>
      <span class="date">{{DATE}}</span>
    </header>

    <div class="counter">{{TOTAL}}</div>

    <form method="post" action="/count/increment">
      <button class="tap" type="submit">أستغفر الله</button>
    </form>
    <form method="post" action="/count/reset">
      <button class="reset" type="submit">إعادة التعيين</button>
    </form>

    <section class="stats">
      <div class="stat">
        <span class="label">اليوم</span>
        <span class="value">{{TODAY}}</span>
      </div>
      <div class="stat">
        <span class="label">متوسط الاستغفار اليومي</span>
        <span class="value">{{DAILY_AVG}}</span>
      </div>
      <div class="stat">
        <span class="label">متوسط الاستغفار الأسبوعي</span>
        <span class="value">{{WEEKLY_AVG}}</span>
      </div>
      <div class="stat">
        <span class="label">أعلى يوم</span>
        <span class="value">{{HIGHEST}}</span>
      </div>
    </section>
  </main>
</body>
</html>
"#;
