//! Browser pages for managing customers.
//!
//! Both pages are static; all data flows through the JSON API with `fetch`.

use axum::response::Html;

/// GET /
///
/// Create form plus the table of all customers.
pub async fn list_page() -> Html<&'static str> {
    Html(LIST_PAGE)
}

/// GET /customers/{id}/view
///
/// Detail and edit form for one customer. The id is read client-side from the URL.
pub async fn detail_page() -> Html<&'static str> {
    Html(DETAIL_PAGE)
}

const LIST_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Customers</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 64rem; margin: 2rem auto; padding: 0 1rem; }
        section { border: 1px solid #ddd; border-radius: 1rem; padding: 1rem; margin-bottom: 1.5rem; }
        form { display: grid; grid-template-columns: repeat(4, 1fr); gap: .75rem; }
        input { padding: .5rem; border: 1px solid #ccc; border-radius: .5rem; }
        table { width: 100%; border-collapse: collapse; font-size: .9rem; }
        th, td { text-align: left; padding: .5rem 1rem .5rem 0; border-bottom: 1px solid #eee; }
        button, a.button { padding: .35rem .75rem; border-radius: .4rem; border: 0; cursor: pointer; text-decoration: none; font-size: .85rem; }
        .primary { background: #2563eb; color: #fff; }
        .danger { background: #dc2626; color: #fff; }
    </style>
</head>
<body>
    <h1>Customers</h1>

    <section>
        <h2>Add Customer</h2>
        <form id="create-form">
            <input name="name" placeholder="Name" required>
            <input name="dateOfBirth" type="date" required>
            <input name="memberNumber" type="number" min="1" placeholder="Member No." required>
            <input name="interests" placeholder="Interests (comma separated)" required>
            <button class="primary" type="submit">Create</button>
        </form>
    </section>

    <section>
        <h2>All Customers <button id="refresh" type="button">Refresh</button></h2>
        <table>
            <thead>
                <tr><th>Name</th><th>DOB</th><th>#</th><th>Interests</th><th>Actions</th></tr>
            </thead>
            <tbody id="rows"></tbody>
        </table>
    </section>

    <script>
        async function api(path, options) {
            const res = await fetch(path, Object.assign({ cache: "no-store" }, options));
            const body = await res.json().catch(() => ({}));
            if (!res.ok) throw new Error(body.error || ("Request failed: " + res.status));
            return body;
        }

        function cell(text) {
            const td = document.createElement("td");
            td.textContent = text;
            return td;
        }

        async function reload() {
            const button = document.getElementById("refresh");
            button.disabled = true;
            button.textContent = "Loading...";
            try {
                const items = await api("/customers");
                const rows = document.getElementById("rows");
                rows.replaceChildren();
                for (const it of items) {
                    const tr = document.createElement("tr");
                    tr.append(
                        cell(it.name),
                        cell(it.dateOfBirth ? new Date(it.dateOfBirth).toLocaleDateString() : "-"),
                        cell(it.memberNumber),
                        cell(it.interests),
                    );
                    const actions = document.createElement("td");
                    const view = document.createElement("a");
                    view.className = "button primary";
                    view.href = "/customers/" + it.id + "/view";
                    view.textContent = "View";
                    const del = document.createElement("button");
                    del.className = "danger";
                    del.textContent = "Delete";
                    del.onclick = async () => {
                        if (!confirm("Delete this customer?")) return;
                        try {
                            await api("/customers/" + it.id, { method: "DELETE" });
                            reload();
                        } catch (e) { alert(e.message); }
                    };
                    actions.append(view, " ", del);
                    tr.append(actions);
                    rows.append(tr);
                }
                if (items.length === 0) {
                    const tr = document.createElement("tr");
                    const td = cell("No customers yet.");
                    td.colSpan = 5;
                    tr.append(td);
                    rows.append(tr);
                }
            } catch (e) {
                alert(e.message);
            } finally {
                button.disabled = false;
                button.textContent = "Refresh";
            }
        }

        document.getElementById("create-form").onsubmit = async (event) => {
            event.preventDefault();
            const form = event.target;
            const data = new FormData(form);
            try {
                await api("/customers", {
                    method: "POST",
                    headers: { "Content-Type": "application/json" },
                    body: JSON.stringify({
                        name: data.get("name").trim(),
                        dateOfBirth: new Date(data.get("dateOfBirth")).toISOString(),
                        memberNumber: Number(data.get("memberNumber")),
                        interests: data.get("interests").trim(),
                    }),
                });
                form.reset();
                reload();
            } catch (e) {
                alert(e.message);
            }
        };

        document.getElementById("refresh").onclick = reload;
        reload();
    </script>
</body>
</html>
"#;

const DETAIL_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Customer Detail</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
        section { border: 1px solid #ddd; border-radius: 1rem; padding: 1rem; margin-bottom: 1.5rem; }
        form { display: grid; gap: .75rem; }
        label { display: grid; gap: .25rem; font-size: .9rem; color: #555; }
        input { padding: .5rem; border: 1px solid #ccc; border-radius: .5rem; }
        button { padding: .5rem 1rem; border-radius: .4rem; border: 0; cursor: pointer; }
        .save { background: #16a34a; color: #fff; }
        .danger { background: #dc2626; color: #fff; }
    </style>
</head>
<body>
    <h1>Customer Detail <a href="/">Back</a></h1>
    <main id="status">Loading…</main>

    <section id="meta" hidden>
        <div><strong>ID:</strong> <span id="id"></span></div>
        <div><strong>Created:</strong> <span id="created"></span></div>
        <div><strong>Updated:</strong> <span id="updated"></span></div>
    </section>

    <section id="editor" hidden>
        <h2>Edit</h2>
        <form id="edit-form">
            <label>Name <input name="name" required></label>
            <label>Date of Birth <input name="dateOfBirth" type="date" required></label>
            <label>Member Number <input name="memberNumber" type="number" min="1" required></label>
            <label>Interests <input name="interests" required></label>
            <div>
                <button class="save" type="submit">Save</button>
                <button class="danger" type="button" id="delete">Delete</button>
            </div>
        </form>
    </section>

    <script>
        const id = decodeURIComponent(location.pathname.split("/")[2] || "");
        const url = "/customers/" + encodeURIComponent(id);

        async function api(path, options) {
            const res = await fetch(path, Object.assign({ cache: "no-store" }, options));
            const body = await res.json().catch(() => ({}));
            if (!res.ok) throw new Error(body.error || ("Request failed: " + res.status));
            return body;
        }

        async function load() {
            try {
                const doc = await api(url);
                document.getElementById("status").hidden = true;
                document.getElementById("meta").hidden = false;
                document.getElementById("editor").hidden = false;
                document.getElementById("id").textContent = doc.id;
                document.getElementById("created").textContent = new Date(doc.createdAt).toLocaleString();
                document.getElementById("updated").textContent = new Date(doc.updatedAt).toLocaleString();
                const form = document.getElementById("edit-form");
                form.elements["name"].value = doc.name;
                form.elements["dateOfBirth"].value = (doc.dateOfBirth || "").slice(0, 10);
                form.elements["memberNumber"].value = doc.memberNumber;
                form.elements["interests"].value = doc.interests;
            } catch (e) {
                document.getElementById("status").textContent = e.message;
            }
        }

        document.getElementById("edit-form").onsubmit = async (event) => {
            event.preventDefault();
            const data = new FormData(event.target);
            try {
                await api(url, {
                    method: "PUT",
                    headers: { "Content-Type": "application/json" },
                    body: JSON.stringify({
                        name: data.get("name").trim(),
                        dateOfBirth: new Date(data.get("dateOfBirth")).toISOString(),
                        memberNumber: Number(data.get("memberNumber")),
                        interests: data.get("interests").trim(),
                    }),
                });
                await load();
                alert("Saved!");
            } catch (e) {
                alert(e.message);
            }
        };

        document.getElementById("delete").onclick = async () => {
            if (!confirm("Delete this customer?")) return;
            try {
                await api(url, { method: "DELETE" });
                location.href = "/";
            } catch (e) {
                alert(e.message);
            }
        };

        load();
    </script>
</body>
</html>
"#;
